use tracing_subscriber::{fmt, EnvFilter};

/// Used when `RUST_LOG` is unset or unparsable. sqlx logs every statement
/// at info, which drowns the refresh cycle output.
const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global tracing subscriber. Call once, from main.
pub fn init_logging() {
    let filter = env_filter();
    let directives = filter.to_string();

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();

    tracing::info!(%directives, "Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        let filter = EnvFilter::try_new(DEFAULT_DIRECTIVES).unwrap();
        assert!(filter.to_string().contains("sqlx=warn"));
    }
}
