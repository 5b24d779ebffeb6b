//! User-selected forecast location.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A (county, township) pair naming a forecast location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Location {
    pub county: String,
    pub township: String,
}

impl Location {
    pub fn new(county: impl Into<String>, township: impl Into<String>) -> Self {
        Self {
            county: county.into(),
            township: township.into(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("臺北市", "大安區")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.county, self.township)
    }
}
