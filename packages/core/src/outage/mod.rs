//! Water outage domain
//!
//! Types, error kinds and capability traits shared by the extractor,
//! the refresh scheduler and the persistence layer.

pub mod error;
pub mod extractor;
pub mod parser;
pub mod provider;
pub mod types;

pub use error::{ExtractError, RefreshError, StoreError};
pub use extractor::WaterGovGeExtractor;
pub use provider::{OutageProvider, OutageStore};
pub use types::*;
