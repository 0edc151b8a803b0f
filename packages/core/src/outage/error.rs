//! Error types for outage extraction, persistence and refresh cycles

use thiserror::Error;

/// Errors raised while fetching or parsing source documents.
///
/// Transport failures carry the attempted URL; structural failures are
/// named after the field that could not be located.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("fetch html file at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch html file at {url}: unexpected HTTP status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("fetch html file at {url}: response body not found")]
    NoResponseBody { url: String },

    #[error("listing payload not found")]
    ListingPayloadNotFound,

    #[error("malformed listing payload: {source}")]
    MalformedListing {
        #[source]
        source: serde_json::Error,
    },

    #[error("outage start not found")]
    OutageStartNotFound,

    #[error("outage end not found")]
    OutageEndNotFound,

    #[error("invalid {field} timestamp '{value}': {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("outage affected customers not found")]
    AffectedCustomersNotFound,

    #[error("invalid affected customers count '{value}'")]
    InvalidAffectedCustomers { value: String },

    #[error("no addresses")]
    NoAddresses,

    #[error("incident {id}: {source}")]
    Incident {
        id: String,
        #[source]
        source: Box<ExtractError>,
    },
}

impl ExtractError {
    /// Attach the marker id of the incident being processed.
    pub fn for_incident(self, id: impl Into<String>) -> Self {
        Self::Incident {
            id: id.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping incident context wrappers.
    pub fn kind(&self) -> &ExtractError {
        match self {
            Self::Incident { source, .. } => source.kind(),
            other => other,
        }
    }

    /// `true` for network-level failures, `false` for structural ones.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            Self::Transport { .. } | Self::UnexpectedStatus { .. } | Self::NoResponseBody { .. }
        )
    }
}

/// Errors from the outage store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("save water outages: {source}")]
    Save {
        #[source]
        source: sqlx::Error,
    },

    #[error("get water outages: {source}")]
    Query {
        #[source]
        source: sqlx::Error,
    },

    #[error("encode addresses: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt stored outage ({key}): {message}")]
    Corrupt { key: String, message: String },
}

/// Failure of one refresh cycle, as observed by the scheduler
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("refresh water outages: {0}")]
    Extract(#[from] ExtractError),

    #[error("refresh water outages: {0}")]
    Store(#[from] StoreError),
}
