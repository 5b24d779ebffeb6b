//! On-demand short-forecast service.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{ApiConfig, Gazetteer, Location, ShortForecast};
use crate::parser::forecast::parse_short_forecast;
use crate::services::{FeedFetcher, FeedRequest};

/// What a caller gets back from a forecast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastState {
    /// Nothing usable yet: the feed answered but not every sequence lined up
    NoData,
    /// A fully assembled forecast
    Ready(ShortForecast),
    /// The request failed; `retryable` is set for network failures
    Unavailable { reason: String, retryable: bool },
}

impl ForecastState {
    pub fn forecast(&self) -> Option<&ShortForecast> {
        match self {
            Self::Ready(forecast) => Some(forecast),
            _ => None,
        }
    }
}

/// Fetches 3-hourly forecasts for gazetteer locations.
#[derive(Clone)]
pub struct ForecastService {
    fetcher: Arc<dyn FeedFetcher>,
    api: ApiConfig,
    gazetteer: Arc<Gazetteer>,
}

impl ForecastService {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, api: ApiConfig, gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            fetcher,
            api,
            gazetteer,
        }
    }

    /// Fetch and decode the forecast for one location.
    pub async fn fetch(&self, location: &Location) -> Result<ShortForecast> {
        let (county, township) = self.gazetteer.resolve(location)?;
        let url = FeedRequest::dataset(&county.short_id)
            .location(&township.name)
            .url(&self.api)?;

        let xml = self.fetcher.fetch(&url).await?;
        parse_short_forecast(&xml)
    }

    /// Like [`fetch`](Self::fetch), but folds every outcome into a [`ForecastState`].
    pub async fn load(&self, location: &Location) -> ForecastState {
        match self.fetch(location).await {
            Ok(forecast) if forecast.is_complete() => ForecastState::Ready(forecast),
            Ok(forecast) => {
                log::warn!(
                    "Forecast for {} is incomplete ({} time slots)",
                    location,
                    forecast.len()
                );
                ForecastState::NoData
            }
            Err(e) => {
                log::warn!("Forecast for {} failed: {}", location, e);
                ForecastState::Unavailable {
                    reason: e.to_string(),
                    retryable: e.is_network(),
                }
            }
        }
    }
}
