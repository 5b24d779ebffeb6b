//! Alert poller.
//!
//! One long-lived loop per run: fetch the alert feed, fingerprint the
//! decoded list, and when the fingerprint differs from the last one seen,
//! notify every current alert and persist the new fingerprint.
//!
//! Known limitations, kept on purpose:
//! - a changed fingerprint re-notifies *all* current alerts, not only new ones;
//! - the fingerprint is order-sensitive, so a feed that reorders unchanged
//!   alerts triggers a fresh round of notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{Alert, PollerConfig};
use crate::pipeline::{AlertFingerprint, AlertNotification, Notifier};
use crate::services::AlertService;
use crate::storage::KeyValueStore;

/// Result of one successful poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Same fingerprint as last time; nothing was sent
    Unchanged { alert_count: usize },
    /// Fingerprint changed; one notification per current alert was sent
    Notified {
        notified: usize,
        fingerprint: AlertFingerprint,
    },
}

/// Periodic alert fetcher and notifier.
pub struct AlertPoller {
    alerts: AlertService,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn KeyValueStore>,
    fingerprint_key: String,
    interval: Duration,
}

impl AlertPoller {
    pub fn new(
        alerts: AlertService,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
        config: &PollerConfig,
    ) -> Self {
        Self {
            alerts,
            notifier,
            store,
            fingerprint_key: config.fingerprint_key.clone(),
            interval: config.interval(),
        }
    }

    /// Read the persisted fingerprint, `None` before the first successful cycle.
    pub async fn load_fingerprint(&self) -> Result<Option<AlertFingerprint>> {
        Ok(self
            .store
            .get(&self.fingerprint_key)
            .await?
            .map(AlertFingerprint::from_stored))
    }

    /// Fetch once and notify if the alert list changed since `last`.
    ///
    /// On error nothing is sent past the failure point and neither `last`
    /// nor the stored fingerprint changes.
    pub async fn run_cycle(&self, last: &mut Option<AlertFingerprint>) -> Result<CycleOutcome> {
        let alerts = self.alerts.fetch_alerts().await?;
        self.settle(&alerts, last).await
    }

    /// Compare, notify and commit for an already-fetched alert list.
    async fn settle(
        &self,
        alerts: &[Alert],
        last: &mut Option<AlertFingerprint>,
    ) -> Result<CycleOutcome> {
        let fingerprint = AlertFingerprint::of(alerts);
        if last.as_ref() == Some(&fingerprint) {
            return Ok(CycleOutcome::Unchanged {
                alert_count: alerts.len(),
            });
        }

        for alert in alerts {
            let notification = AlertNotification::from_alert(alert);
            self.notifier.notify(&notification).await?;
        }

        // Commit only once every notification went out.
        self.store
            .set(&self.fingerprint_key, fingerprint.as_str())
            .await?;
        *last = Some(fingerprint.clone());

        Ok(CycleOutcome::Notified {
            notified: alerts.len(),
            fingerprint,
        })
    }

    /// Poll until cancelled.
    ///
    /// Returns `Ok(())` on cancellation and the first cycle error otherwise;
    /// the caller decides when to start a fresh run. Cancellation is observed
    /// while fetching and while waiting for the next cycle, never between
    /// notifying and committing the fingerprint.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut last = self.load_fingerprint().await?;
        log::info!(
            "Alert poller started (interval {}s, last fingerprint {})",
            self.interval.as_secs(),
            last.as_ref().map_or("none", |fp| fp.as_str())
        );

        loop {
            let alerts = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                fetched = self.alerts.fetch_alerts() => fetched?,
            };

            match self.settle(&alerts, &mut last).await? {
                CycleOutcome::Unchanged { alert_count } => {
                    log::debug!("Alerts unchanged ({} active)", alert_count);
                }
                CycleOutcome::Notified {
                    notified,
                    fingerprint,
                } => {
                    log::info!("Sent {} alert notifications ({})", notified, fingerprint);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::info!("Alert poller stopped");
        Ok(())
    }
}

/// Keep a poller running the way a host job scheduler would.
///
/// A failed run is logged and started again from persisted state after
/// `restart_delay`. Returns once `cancel` fires.
pub async fn supervise(poller: &AlertPoller, cancel: CancellationToken, restart_delay: Duration) {
    loop {
        match poller.run(cancel.clone()).await {
            Ok(()) => return,
            Err(e) if e.is_network() => {
                log::warn!("Alert poll failed: {}. Retrying in {}s", e, restart_delay.as_secs());
            }
            Err(e) => {
                log::error!("Alert poll failed: {}. Retrying in {}s", e, restart_delay.as_secs());
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(restart_delay) => {}
        }
    }
}
