//! Change fingerprint of a decoded alert sequence.
//!
//! The poller keeps only this value between runs. It is compared for
//! equality and never used to identify single alerts.
//!
//! The digest covers every field of every alert **in feed order**. The same
//! alerts served in a different order produce a different fingerprint and
//! therefore a fresh round of notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Alert;

/// Hex-encoded SHA-256 digest of an ordered alert sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertFingerprint(String);

impl AlertFingerprint {
    /// Fingerprint a full alert sequence.
    pub fn of(alerts: &[Alert]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((alerts.len() as u64).to_be_bytes());

        for alert in alerts {
            let issue = alert.issue_time.to_string();
            let end = alert.end_time.to_string();
            for field in [
                alert.description.as_str(),
                issue.as_str(),
                end.as_str(),
                alert.content.as_str(),
            ] {
                // Length prefix keeps ("ab", "c") apart from ("a", "bc").
                hasher.update((field.len() as u64).to_be_bytes());
                hasher.update(field.as_bytes());
            }
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a value read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
