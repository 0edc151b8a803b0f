//! Core data types for water outages

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// UTC offset of the source's civil time (Asia/Tbilisi, no DST since 2005).
pub const SOURCE_UTC_OFFSET_SECS: i32 = 4 * 3600;

/// The fixed zone every outage timestamp is parsed in and serialized with.
pub fn source_offset() -> FixedOffset {
    FixedOffset::east_opt(SOURCE_UTC_OFFSET_SECS).expect("source offset is within ±24h")
}

/// A service point published on the listing map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub title_ge: String,
    /// Latin rendering of `title_ge`; the store's partition key.
    pub title_lat: String,
    pub lat: String,
    pub lng: String,
}

/// One outage incident at a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageRecord {
    pub location: Location,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub affected_customers: u32,
    pub addresses_ge: Vec<String>,
}

/// A raw marker decoded from the listing page's embedded payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapMarker {
    #[serde(default)]
    pub problem: bool,
    pub id: String,
    pub title: String,
    pub lat: String,
    pub lng: String,
}
