//! Outage refresh scheduler.
//!
//! Drives the refresh loop: each tick pulls every active outage from the
//! provider and hands the batch to the store, so the read path always
//! serves the last successfully persisted snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::metrics::AppMetrics;
use crate::outage::{OutageProvider, OutageStore, RefreshError};

/// Shared handle to the outage source.
pub type SharedProvider = Arc<dyn OutageProvider + Send + Sync>;
/// Shared handle to the outage sink.
pub type SharedStore = Arc<dyn OutageStore + Send + Sync>;

/// Run the outage refresh loop.
///
/// The first cycle starts immediately; later cycles start one `interval`
/// after the previous one began, or right after it finished if it overran.
/// Cycles never overlap. Errors from a cycle are logged and counted and the
/// loop continues.
///
/// Runs until `shutdown` flips to `true` or its sender is dropped. A cycle
/// in flight at that point is abandoned before anything is committed.
pub async fn run_refresh_loop(
    provider: SharedProvider,
    store: SharedStore,
    metrics: Arc<AppMetrics>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        provider = provider.provider_name(),
        "Outage refresh started (interval: {}s)",
        interval.as_secs()
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => break,
            _ = ticker.tick() => {}
        }

        metrics.refresh_cycles_total.inc();

        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => {
                tracing::info!("Shutdown during refresh cycle, discarding its results");
                break;
            }
            result = refresh_once(provider.as_ref(), store.as_ref()) => {
                record_cycle(&metrics, result);
            }
        }
    }

    tracing::info!("Outage refresh stopped cleanly");
}

/// Execute a single refresh cycle: fetch everything, then save it as one batch.
pub async fn refresh_once(
    provider: &(dyn OutageProvider + Send + Sync),
    store: &(dyn OutageStore + Send + Sync),
) -> Result<usize, RefreshError> {
    let outages = provider.fetch_all().await?;

    if outages.is_empty() {
        tracing::warn!("Provider returned no outages this cycle");
    }

    store.save_batch(&outages).await?;
    Ok(outages.len())
}

fn record_cycle(metrics: &AppMetrics, result: Result<usize, RefreshError>) {
    match result {
        Ok(saved) => {
            metrics.outages_saved_total.inc_by(saved as f64);
            metrics.last_batch_size.set(saved as f64);
            tracing::info!(saved, "Refresh cycle complete");
        }
        Err(err) => {
            let stage = match err {
                RefreshError::Extract(_) => "extract",
                RefreshError::Store(_) => "store",
            };
            metrics.refresh_errors_total.with_label_values(&[stage]).inc();
            tracing::error!(stage, "refresh water outages failed: {}", err);
        }
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // Err means the sender is gone; nobody is left to keep us running.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
