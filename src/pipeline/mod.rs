//! Alert change detection and notification.

pub mod fingerprint;
pub mod notify;
pub mod poller;

pub use fingerprint::AlertFingerprint;
pub use notify::{AlertNotification, LogNotifier, NOTIFICATION_TIME_FORMAT, NotificationId, Notifier};
pub use poller::{AlertPoller, CycleOutcome, supervise};
