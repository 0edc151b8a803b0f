use clap::Parser;

/// Outage monitor CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "outage-monitor",
    version,
    about = "Collects water.gov.ge outage notices into a queryable store"
)]
pub struct Cli {
    /// Database connection URL (e.g. sqlite://outages.db?mode=rwc)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long)]
    pub listen: Option<String>,

    /// Base URL of the outage source site
    #[arg(long)]
    pub source_url: Option<String>,

    /// Refresh interval in seconds
    #[arg(long)]
    pub refresh_interval: Option<u64>,
}
