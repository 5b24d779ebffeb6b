// src/models/mod.rs

//! Domain models for the weather application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod alert;
mod config;
mod forecast;
mod gazetteer;
mod location;

// Re-export all public types
pub use alert::Alert;
pub use config::{ApiConfig, Config, LoggingConfig, PathsConfig, PollerConfig};
pub use forecast::{ForecastSlot, ShortForecast, Weather};
pub use gazetteer::{County, Gazetteer, Township};
pub use location::Location;
