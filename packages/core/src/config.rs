use std::env;
use std::time::Duration;

use crate::cli::Cli;
use crate::retry::DEFAULT_MAX_ATTEMPTS;
use crate::services::water_gov_ge::DEFAULT_BASE_URL;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "OUTAGE_MONITOR_";

const DEFAULT_DATABASE_URL: &str = "sqlite://outages.db?mode=rwc";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub source_base_url: String,
    pub refresh_interval: Duration,
    pub store_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            source_base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            store_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Read `OUTAGE_MONITOR_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(url) = lookup("SOURCE_BASE_URL") {
            config.source_base_url = url;
        }
        if let Some(raw) = lookup("REFRESH_INTERVAL_SECONDS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| format!("{ENV_PREFIX}REFRESH_INTERVAL_SECONDS must be a valid number"))?;
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("STORE_MAX_ATTEMPTS") {
            config.store_max_attempts = raw
                .parse::<u32>()
                .map_err(|_| format!("{ENV_PREFIX}STORE_MAX_ATTEMPTS must be a valid number"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self, String> {
        if let Some(url) = &cli.database_url {
            self.database_url = url.clone();
        }
        if let Some(addr) = &cli.listen {
            self.listen_addr = addr.clone();
        }
        if let Some(url) = &cli.source_url {
            self.source_base_url = url.clone();
        }
        if let Some(secs) = cli.refresh_interval {
            self.refresh_interval = Duration::from_secs(secs);
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), String> {
        if self.refresh_interval.is_zero() {
            return Err("refresh interval must be greater than zero".to_string());
        }
        if self.store_max_attempts == 0 {
            return Err("store max attempts must be at least 1".to_string());
        }
        Ok(())
    }
}
