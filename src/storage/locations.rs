//! Saved forecast locations.

use crate::error::Result;
use crate::models::Location;
use crate::storage::KeyValueStore;

/// Storage key of the saved-locations list.
pub const LOCATIONS_KEY: &str = "locations";

/// Ordered, duplicate-free list of locations kept in a [`KeyValueStore`].
pub struct LocationBook<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> LocationBook<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Saved locations in insertion order.
    pub async fn list(&self) -> Result<Vec<Location>> {
        match self.store.get(LOCATIONS_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append a location. Returns `false` if it was already saved.
    pub async fn add(&self, location: Location) -> Result<bool> {
        let mut locations = self.list().await?;
        if locations.contains(&location) {
            return Ok(false);
        }

        log::info!("Saving location {}", location);
        locations.push(location);
        let json = serde_json::to_string(&locations)?;
        self.store.set(LOCATIONS_KEY, &json).await?;
        Ok(true)
    }
}
