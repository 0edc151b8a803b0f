use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;

use outage_monitor::api::{self, AppState};
use outage_monitor::cli::Cli;
use outage_monitor::config::Config;
use outage_monitor::db;
use outage_monitor::error::AppError;
use outage_monitor::logging::init_logging;
use outage_monitor::metrics::AppMetrics;
use outage_monitor::outage::WaterGovGeExtractor;
use outage_monitor::repository::OutageRepository;
use outage_monitor::retry::RetryPolicy;
use outage_monitor::scheduler::{run_refresh_loop, SharedProvider, SharedStore};
use outage_monitor::services::water_gov_ge::WaterGovGeClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()
        .and_then(|config| config.with_cli(&cli))
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    tracing::info!("Service starting with config: {:?}", config);

    if let Err(err) = run(config).await {
        tracing::error!("run: {}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    let pool = db::create_pool(&config.database_url).await?;
    let repository = OutageRepository::new(pool).with_retry_policy(
        RetryPolicy::default().with_max_attempts(config.store_max_attempts),
    );
    let store: SharedStore = Arc::new(repository);

    let client = WaterGovGeClient::new(config.source_base_url.clone())?;
    let provider: SharedProvider = Arc::new(WaterGovGeExtractor::new(client));

    let metrics = Arc::new(AppMetrics::new()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = tokio::spawn(run_refresh_loop(
        provider,
        store.clone(),
        metrics.clone(),
        config.refresh_interval,
        shutdown_rx,
    ));

    let app = api::create_router(AppState { store, metrics });
    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Err(err) = refresher.await {
        tracing::error!("Refresh task ended abnormally: {}", err);
    }

    tracing::info!("good bye");
    Ok(())
}
