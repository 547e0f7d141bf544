//! Precis API Gateway
//!
//! The entry point for all external API requests.
//! Handles:
//! - Configuration and secret validation
//! - Logging and Prometheus metrics
//! - Database bootstrap
//! - Serving the router with graceful shutdown

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use precis_common::{
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    llm::create_generator,
    metrics::{self as app_metrics, LATENCY_BUCKETS, METRICS_PREFIX, MODEL_BUCKETS},
};
use precis_gateway::{create_router, AppState};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!("Starting Precis API Gateway v{}", precis_common::VERSION);

    config.validate().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    // Initialize metrics
    init_metrics(&config.observability)?;

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;
    if config.database.auto_migrate {
        db.migrate().await?;
    }

    // Model client, constructed once and shared
    let generator = create_generator(&config.llm)?;
    info!(model = generator.model_name(), "Text generator ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shutdown_timeout = config.shutdown_timeout();

    // Create app state and router
    let state = AppState::new(config, db, generator)?;
    let app = create_router(state)?;

    // Start the server
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], config.metrics_port)))
        .set_buckets(LATENCY_BUCKETS)?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_model_duration_seconds", METRICS_PREFIX)),
            MODEL_BUCKETS,
        )?
        .install()?;

    app_metrics::register_metrics();
    info!(port = config.metrics_port, "Metrics exporter listening");
    Ok(())
}

/// Graceful shutdown signal handler
///
/// Once a signal arrives, in-flight requests get `grace` to finish before the
/// process exits.
async fn shutdown_signal(grace: std::time::Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Shutdown grace period elapsed, exiting");
        std::process::exit(0);
    });
}
