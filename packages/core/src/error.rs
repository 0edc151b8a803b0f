use thiserror::Error;

use crate::outage::ExtractError;

/// Unified application error.
///
/// Covers startup and server failures. Refresh-cycle errors never reach
/// this type; the scheduler logs them and moves on.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Source client error: {0}")]
    Source(#[from] ExtractError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
