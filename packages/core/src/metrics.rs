//! Prometheus metrics registry for the outage monitor.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the refresh scheduler and HTTP layer.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, CounterVec, Gauge, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Refresh cycles started (success + failure).
    pub refresh_cycles_total: Counter,
    /// Refresh cycles that ended in an error.
    pub refresh_errors_total: CounterVec,
    /// Outage records handed to the store across all cycles.
    pub outages_saved_total: Counter,
    /// Size of the most recently saved batch.
    pub last_batch_size: Gauge,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let refresh_cycles_total = Counter::with_opts(Opts::new(
            "outage_monitor_refresh_cycles_total",
            "Refresh cycles started",
        ))?;

        let refresh_errors_total = CounterVec::new(
            Opts::new(
                "outage_monitor_refresh_errors_total",
                "Refresh cycles that failed, by stage",
            ),
            &["stage"],
        )?;

        let outages_saved_total = Counter::with_opts(Opts::new(
            "outage_monitor_outages_saved_total",
            "Outage records written to the store",
        ))?;

        let last_batch_size = Gauge::with_opts(Opts::new(
            "outage_monitor_last_batch_size",
            "Number of outages in the last saved batch",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "outage_monitor_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        registry.register(Box::new(refresh_cycles_total.clone()))?;
        registry.register(Box::new(refresh_errors_total.clone()))?;
        registry.register(Box::new(outages_saved_total.clone()))?;
        registry.register(Box::new(last_batch_size.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            refresh_cycles_total,
            refresh_errors_total,
            outages_saved_total,
            last_batch_size,
            http_requests_total,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
