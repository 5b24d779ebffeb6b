//! Alert feed service: fetch the alert dataset and decode it.

use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::models::{Alert, ApiConfig};
use crate::parser::alerts::parse_alerts;
use crate::services::{FeedFetcher, FeedRequest};
use crate::utils::display_url;

/// Fetches the current alert list.
#[derive(Clone)]
pub struct AlertService {
    fetcher: Arc<dyn FeedFetcher>,
    url: Url,
}

impl AlertService {
    /// Create a service for the alert dataset named in `api`.
    pub fn new(fetcher: Arc<dyn FeedFetcher>, api: &ApiConfig) -> Result<Self> {
        let url = FeedRequest::dataset(&api.alert_dataset).url(api)?;
        Ok(Self { fetcher, url })
    }

    /// Fetch and decode the alert feed, in feed order.
    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>> {
        let xml = self.fetcher.fetch(&self.url).await?;
        let alerts = parse_alerts(&xml)?;
        log::debug!("Decoded {} alerts from {}", alerts.len(), display_url(&self.url));
        Ok(alerts)
    }
}
