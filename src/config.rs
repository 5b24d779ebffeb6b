// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! and the gazetteer from a data directory.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, Gazetteer};

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file is missing or invalid.
pub fn load_config(path: &Path) -> Config {
    Config::load_or_default(path).with_env_overrides()
}

/// Load the county/township table.
pub fn load_gazetteer(path: &Path) -> Result<Gazetteer> {
    let gazetteer = Gazetteer::load(path)
        .map_err(|e| AppError::config(format!("Failed to load gazetteer from {path:?}: {e}")))?;

    if gazetteer.is_empty() {
        log::warn!("Gazetteer {:?} has no counties", path);
    }
    Ok(gazetteer)
}

/// Load and validate config and gazetteer from a data directory.
pub fn load_all(data_dir: &Path) -> Result<(Config, Gazetteer)> {
    let config = load_config(&data_dir.join(CONFIG_FILE));
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    let gazetteer = load_gazetteer(&config.paths.gazetteer_path(data_dir))?;
    Ok((config, gazetteer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COUNTIES: &str = r#"[{"name":"臺北市","shortId":"F-D0047-061","longId":"F-D0047-063",
        "townships":[{"name":"大安區","stations":[]}]}]"#;

    #[test]
    fn test_load_all() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[api]\napi_key = \"CWA-TEST\"\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("counties.json"), COUNTIES).unwrap();

        let (config, gazetteer) = load_all(tmp.path()).unwrap();
        assert_eq!(config.poller.interval_secs, 60);
        let (county, _) = gazetteer.resolve(&config.location).unwrap();
        assert_eq!(county.short_id, "F-D0047-061");
    }

    #[test]
    fn test_load_all_without_api_key() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "[api]\napi_key = \"\"\n").unwrap();
        std::fs::write(tmp.path().join("counties.json"), COUNTIES).unwrap();

        let (config, _) = load_all(tmp.path()).unwrap();
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_missing_gazetteer() {
        let tmp = TempDir::new().unwrap();
        let err = load_gazetteer(&tmp.path().join("counties.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
