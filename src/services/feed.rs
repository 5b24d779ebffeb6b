//! Open-data feed requests and the fetch capability.
//!
//! Every CWA datastore feed lives at `{base_url}/{dataset}` and takes the
//! API key as `Authorization`, `format=XML`, and for township forecasts a
//! `locationName`.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;
use crate::utils::display_url;
use crate::utils::http::create_async_client;

/// Fetch capability: return the body of `url` as text.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// [`FeedFetcher`] over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        // reqwest errors carry the full URL, and its query holds the API key.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        log::debug!("GET {} -> {}", display_url(url), status);

        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: display_url(url),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await.map_err(reqwest::Error::without_url)?)
    }
}

/// One datastore query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    dataset: String,
    location_name: Option<String>,
}

impl FeedRequest {
    /// Query for a whole dataset.
    pub fn dataset(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            location_name: None,
        }
    }

    /// Restrict the query to one location, e.g. a township name.
    pub fn location(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Build the request URL.
    pub fn url(&self, api: &ApiConfig) -> Result<Url> {
        let mut url = Url::parse(&api.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("api.base_url cannot be a base: {}", api.base_url)))?
            .pop_if_empty()
            .push(&self.dataset);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("Authorization", &api.api_key)
                .append_pair("format", "XML");
            if let Some(name) = &self.location_name {
                query.append_pair("locationName", name);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiConfig {
        ApiConfig {
            api_key: "CWA-TEST".into(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_alert_url() {
        let url = FeedRequest::dataset("W-C0033-002").url(&api()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://opendata.cwa.gov.tw/api/v1/rest/datastore/W-C0033-002?Authorization=CWA-TEST&format=XML"
        );
    }

    #[test]
    fn test_forecast_url_has_location() {
        let url = FeedRequest::dataset("F-D0047-061")
            .location("大安區")
            .url(&api())
            .unwrap();

        assert_eq!(url.path(), "/api/v1/rest/datastore/F-D0047-061");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("locationName".into(), "大安區".into())));
        assert!(pairs.contains(&("format".into(), "XML".into())));
    }

    #[test]
    fn test_trailing_slash_base() {
        let mut api = api();
        api.base_url = "http://localhost:8080/datastore/".into();
        let url = FeedRequest::dataset("W-C0033-002").url(&api).unwrap();
        assert_eq!(url.path(), "/datastore/W-C0033-002");
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let api = ApiConfig {
            base_url: "http://127.0.0.1:1/datastore".into(),
            api_key: "SECRET-KEY".into(),
            ..ApiConfig::default()
        };
        let url = FeedRequest::dataset("W-C0033-002").url(&api).unwrap();

        let err = HttpFetcher::from_config(&api)
            .unwrap()
            .fetch(&url)
            .await
            .unwrap_err();

        assert!(err.is_network());
        assert!(!err.to_string().contains("SECRET-KEY"));
    }

    #[test]
    fn test_invalid_base() {
        let mut api = api();
        api.base_url = "mailto:someone@example.com".into();
        assert!(FeedRequest::dataset("W-C0033-002").url(&api).is_err());
    }
}
