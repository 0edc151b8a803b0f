//! Outage source and sink interfaces
//!
//! The scheduler only sees these two traits, so either side can be
//! swapped for a test double without touching production wiring.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::outage::{
    error::{ExtractError, StoreError},
    types::OutageRecord,
};

/// Something that can produce the current set of outages.
#[async_trait]
pub trait OutageProvider {
    /// Fetch every active outage. Either all records or an error, never a partial list.
    async fn fetch_all(&self) -> Result<Vec<OutageRecord>, ExtractError>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

/// Keyed range store for outages.
#[async_trait]
pub trait OutageStore {
    /// Upsert a batch keyed by `(title_lat, start)`; last write wins.
    async fn save_batch(&self, records: &[OutageRecord]) -> Result<(), StoreError>;

    /// Outages for `title_lat` whose start is strictly after `now`, ascending by start.
    async fn query_upcoming(
        &self,
        title_lat: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutageRecord>, StoreError>;
}
