//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Render a URL for logs without its query string (which carries the API key).
pub fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
