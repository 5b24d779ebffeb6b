//! Alert notifications.
//!
//! The core only builds the notification text and hands it to a [`Notifier`];
//! channels, icons and delivery belong to the notifier implementation.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Alert;

/// Time layout used in notification text.
pub const NOTIFICATION_TIME_FORMAT: &str = "%m/%d %H:%M";

/// Opaque notification identifier, fresh and unpredictable for every notification.
///
/// Ids are never reused, so a notifier cannot replace an earlier notification
/// for the same alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A ready-to-show notification for one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
}

impl AlertNotification {
    /// Title `【description・issue time】`, body `content(~ end time)`.
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            id: NotificationId::random(),
            title: alert.format("【{description}・{issue_time}】", NOTIFICATION_TIME_FORMAT),
            body: alert.format("{content}(~ {end_time})", NOTIFICATION_TIME_FORMAT),
        }
    }
}

/// Notification capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &AlertNotification) -> Result<()>;
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &AlertNotification) -> Result<()> {
        log::info!(
            "[{}] {} {}",
            notification.id,
            notification.title,
            notification.body
        );
        Ok(())
    }
}
