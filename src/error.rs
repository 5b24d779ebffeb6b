// src/error.rs

//! Unified error handling for the weather application.

use std::fmt;

use thiserror::Error;

/// Result type alias for weather operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response body was read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Feed endpoint answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Feed document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A captured value did not match the expected format
    #[error("Parse error in <{field}> for '{value}': {message}")]
    Parse {
        field: String,
        value: String,
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// County or township missing from the gazetteer
    #[error("Unknown location: {0}")]
    UnknownLocation(String),
}

impl AppError {
    /// Create a parse error for a captured field value.
    pub fn parse(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Parse {
            field: field.into(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unknown-location error.
    pub fn unknown_location(name: impl Into<String>) -> Self {
        Self::UnknownLocation(name.into())
    }

    /// Fetch failures: the transport failed or the server refused the request.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpStatus { .. })
    }

    /// Decode failures: the feed contract no longer matches what we parse.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Xml(_) | Self::Parse { .. })
    }
}
