// src/lib.rs

//! Rainbow Weather library.
//!
//! Fetches CWA open-data alert and forecast feeds, decodes them with a
//! streaming XML record parser, and polls alerts for notification.

pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
