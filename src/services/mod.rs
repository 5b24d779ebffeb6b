//! Service layer for the weather application.
//!
//! This module contains the business logic for:
//! - Feed requests and fetching (`FeedRequest`, `FeedFetcher`)
//! - Alert fetching (`AlertService`)
//! - Short-forecast fetching (`ForecastService`)

mod alerts;
mod feed;
mod forecast;

pub use alerts::AlertService;
pub use feed::{FeedFetcher, FeedRequest, HttpFetcher};
pub use forecast::{ForecastService, ForecastState};
