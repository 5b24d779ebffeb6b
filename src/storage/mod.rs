//! Key/value persistence for state that must survive restarts.
//!
//! The poller keeps exactly one slot here (the last alert fingerprint);
//! the saved-locations list lives in a second slot.
//!
//! ## File Layout
//!
//! ```text
//! state.json
//! {
//!   "alertsId": "9f86d081884c7d65...",
//!   "locations": "[{\"county\":\"臺北市\",\"township\":\"大安區\"}]"
//! }
//! ```

pub mod local;
pub mod locations;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStore;
pub use locations::LocationBook;
pub use memory::MemoryStore;

/// Trait for string key/value backends.
///
/// A successful `set` is durable: a later `get`, even from a new process,
/// returns the new value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
