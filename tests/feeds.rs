//! End-to-end tests over the public library API with a fake feed backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rainbow_weather::error::{AppError, Result};
use rainbow_weather::models::{ApiConfig, Gazetteer, Location, PollerConfig};
use rainbow_weather::pipeline::{AlertNotification, AlertPoller, CycleOutcome, Notifier};
use rainbow_weather::services::{AlertService, FeedFetcher, ForecastService, ForecastState};
use rainbow_weather::storage::{KeyValueStore, LocalStore};
use tempfile::TempDir;
use url::Url;

const COUNTIES: &str = r#"[
  {"name":"臺北市","shortId":"F-D0047-061","longId":"F-D0047-063",
   "townships":[{"name":"大安區","stations":["466920"]},{"name":"信義區"}]},
  {"name":"花蓮縣","shortId":"F-D0047-041","longId":"F-D0047-043",
   "townships":[{"name":"花蓮市","stations":[]}]}
]"#;

/// Serves bodies keyed by dataset id and records every requested URL.
#[derive(Default)]
struct FakeFeeds {
    bodies: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<Url>>,
}

impl FakeFeeds {
    fn serve(&self, dataset: &str, body: impl Into<String>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(dataset.to_string(), body.into());
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for FakeFeeds {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.requests.lock().unwrap().push(url.clone());
        let dataset = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();

        match self.bodies.lock().unwrap().get(&dataset) {
            Some(body) => Ok(body.clone()),
            None => Err(AppError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[derive(Default)]
struct CollectingNotifier {
    sent: Mutex<Vec<AlertNotification>>,
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn notify(&self, notification: &AlertNotification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn api() -> ApiConfig {
    ApiConfig {
        api_key: "CWA-TEST".to_string(),
        ..ApiConfig::default()
    }
}

fn alert_feed(descriptions: &[&str]) -> String {
    let records: String = descriptions
        .iter()
        .map(|description| {
            format!(
                "<record><datasetInfo><datasetDescription>{description}</datasetDescription>\
                 <validTime><startTime>2024-07-24 08:00:00</startTime><endTime>2024-07-25 06:00:00</endTime></validTime>\
                 <issueTime>2024-07-24 08:25:00</issueTime></datasetInfo>\
                 <contents><content><contentLanguage>zh-TW</contentLanguage>\
                 <contentText>{description}注意事項</contentText></content></contents></record>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><cwaopendata><dataid>W-C0033-002</dataid><records>{records}</records></cwaopendata>"#
    )
}

fn forecast_feed(with_humidity: bool) -> String {
    let point = |time: &str, value: &str| {
        format!(
            "<time><dataTime>{time}</dataTime><elementValue><value>{value}</value><measures>-</measures></elementValue></time>"
        )
    };
    let span = |start: &str, end: &str, values: &[&str]| {
        let values: String = values
            .iter()
            .map(|v| format!("<elementValue><value>{v}</value></elementValue>"))
            .collect();
        format!("<time><startTime>{start}</startTime><endTime>{end}</endTime>{values}</time>")
    };
    let element = |name: &str, body: String| {
        format!("<weatherElement><elementName>{name}</elementName>{body}</weatherElement>")
    };

    let mut elements = vec![
        element(
            "T",
            point("2024-03-01 21:00:00", "21") + &point("2024-03-02 00:00:00", "20"),
        ),
        element(
            "Wx",
            span("2024-03-01 21:00:00", "2024-03-02 00:00:00", &["多雲", "04"])
                + &span("2024-03-02 00:00:00", "2024-03-02 03:00:00", &["晴", "01"]),
        ),
        element(
            "AT",
            point("2024-03-01 21:00:00", "22") + &point("2024-03-02 00:00:00", "19"),
        ),
        element(
            "PoP6h",
            span("2024-03-01 18:00:00", "2024-03-02 00:00:00", &["20"]),
        ),
    ];
    if with_humidity {
        elements.push(element(
            "RH",
            point("2024-03-01 21:00:00", "75") + &point("2024-03-02 00:00:00", "80"),
        ));
    }

    format!(
        "<cwaopendata><dataset><locations><location><locationName>大安區</locationName>{}</location></locations></dataset></cwaopendata>",
        elements.concat()
    )
}

fn forecast_service(feeds: Arc<FakeFeeds>) -> ForecastService {
    let gazetteer = Gazetteer::from_json(COUNTIES).unwrap();
    ForecastService::new(feeds, api(), Arc::new(gazetteer))
}

#[tokio::test]
async fn alert_service_decodes_feed_in_order() {
    let feeds = Arc::new(FakeFeeds::default());
    feeds.serve("W-C0033-002", alert_feed(&["大雨特報", "陸上強風特報"]));

    let service = AlertService::new(feeds.clone(), &api()).unwrap();
    let alerts = service.fetch_alerts().await.unwrap();

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].description, "大雨特報");
    assert_eq!(alerts[1].content, "陸上強風特報注意事項");

    let url = &feeds.requests()[0];
    assert_eq!(url.path(), "/api/v1/rest/datastore/W-C0033-002");
    assert!(url.query_pairs().any(|(k, v)| k == "Authorization" && v == "CWA-TEST"));
    assert!(url.query_pairs().any(|(k, v)| k == "format" && v == "XML"));
}

#[tokio::test]
async fn forecast_ready_for_known_township() {
    let feeds = Arc::new(FakeFeeds::default());
    feeds.serve("F-D0047-061", forecast_feed(true));

    let state = forecast_service(feeds.clone())
        .load(&Location::default())
        .await;

    let forecast = state.forecast().expect("forecast should be ready");
    assert_eq!(forecast.len(), 2);
    assert_eq!(forecast.precipitation_probability, vec![20, 20]);
    assert_eq!(forecast.weather[1].icon_name(), "weather_day_01");

    let days = forecast.days();
    assert_eq!(days.len(), 2);
    assert_eq!(days[1].1[0].relative_humidity, 80);

    let url = &feeds.requests()[0];
    assert!(url.query_pairs().any(|(k, v)| k == "locationName" && v == "大安區"));
}

#[tokio::test]
async fn forecast_missing_element_is_no_data() {
    let feeds = Arc::new(FakeFeeds::default());
    feeds.serve("F-D0047-061", forecast_feed(false));

    let state = forecast_service(feeds).load(&Location::default()).await;
    assert_eq!(state, ForecastState::NoData);
}

#[tokio::test]
async fn forecast_http_failure_is_retryable() {
    let feeds = Arc::new(FakeFeeds::default());

    let state = forecast_service(feeds)
        .load(&Location::new("花蓮縣", "花蓮市"))
        .await;
    assert!(matches!(
        state,
        ForecastState::Unavailable {
            retryable: true,
            ..
        }
    ));
}

#[tokio::test]
async fn forecast_unknown_location_is_not_fetched() {
    let feeds = Arc::new(FakeFeeds::default());

    let state = forecast_service(feeds.clone())
        .load(&Location::new("臺北市", "不存在區"))
        .await;

    assert!(matches!(
        state,
        ForecastState::Unavailable {
            retryable: false,
            ..
        }
    ));
    assert!(feeds.requests().is_empty());
}

#[tokio::test]
async fn poller_state_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let state_file = tmp.path().join("state.json");
    let feeds = Arc::new(FakeFeeds::default());
    feeds.serve("W-C0033-002", alert_feed(&["大雨特報"]));

    let notifier = Arc::new(CollectingNotifier::default());
    let poller = |store: Arc<dyn KeyValueStore>| {
        AlertPoller::new(
            AlertService::new(feeds.clone(), &api()).unwrap(),
            notifier.clone(),
            store,
            &PollerConfig::default(),
        )
    };

    let first = poller(Arc::new(LocalStore::new(&state_file)));
    let mut last = first.load_fingerprint().await.unwrap();
    assert!(last.is_none());
    assert!(matches!(
        first.run_cycle(&mut last).await.unwrap(),
        CycleOutcome::Notified { notified: 1, .. }
    ));

    // A fresh process sees the committed fingerprint and stays quiet.
    let second = poller(Arc::new(LocalStore::new(&state_file)));
    let mut last = second.load_fingerprint().await.unwrap();
    assert_eq!(
        second.run_cycle(&mut last).await.unwrap(),
        CycleOutcome::Unchanged { alert_count: 1 }
    );

    feeds.serve("W-C0033-002", alert_feed(&["大雨特報", "低溫特報"]));
    assert!(matches!(
        second.run_cycle(&mut last).await.unwrap(),
        CycleOutcome::Notified { notified: 2, .. }
    ));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].title, "【大雨特報・07/24 08:25】");
    assert_eq!(sent[0].body, "大雨特報注意事項(~ 07/25 06:00)");
}
