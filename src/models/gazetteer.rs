//! County and township reference data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Location;

/// A township within a county.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Township {
    /// Township name (e.g., "大安區")
    pub name: String,

    /// Observation station ids near this township
    #[serde(default)]
    pub stations: Vec<String>,
}

/// A county (or special municipality) and the datasets that cover it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct County {
    /// County name (e.g., "臺北市")
    pub name: String,

    /// Dataset id of the 3-hourly township forecast, e.g. "F-D0047-061"
    pub short_id: String,

    /// Dataset id of the weekly township forecast
    pub long_id: String,

    #[serde(default)]
    pub townships: Vec<Township>,
}

impl County {
    pub fn township(&self, name: &str) -> Option<&Township> {
        self.townships.iter().find(|t| t.name == name)
    }
}

/// The bundled county/township table, read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gazetteer {
    counties: Vec<County>,
}

impl Gazetteer {
    pub fn new(counties: Vec<County>) -> Self {
        Self { counties }
    }

    /// Load the county table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn counties(&self) -> &[County] {
        &self.counties
    }

    pub fn county(&self, name: &str) -> Option<&County> {
        self.counties.iter().find(|c| c.name == name)
    }

    /// Check that both halves of a location exist in the table.
    pub fn resolve(&self, location: &Location) -> Result<(&County, &Township)> {
        let county = self
            .county(&location.county)
            .ok_or_else(|| AppError::unknown_location(&location.county))?;
        let township = county
            .township(&location.township)
            .ok_or_else(|| AppError::unknown_location(location.to_string()))?;
        Ok((county, township))
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }
}
