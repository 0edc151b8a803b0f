//! Water outage monitor: scrapes water.gov.ge on an interval, keeps the
//! active outages in SQLite and serves them over HTTP.
//!
//! The binary in `src/main.rs` wires these modules together.

pub mod api;
pub mod db;
pub mod error;
pub mod metrics;
pub mod outage;
pub mod repository;
pub mod retry;
pub mod scheduler;
pub mod services;
pub mod translit;

// Bootstrap-only modules, public so the binary can reach them.
pub mod cli;
pub mod config;
pub mod logging;
