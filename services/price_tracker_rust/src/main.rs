use anyhow::{Context, Result};
use dotenv::dotenv;
use price_tracker_rust::{api, logging, AppContext, Bootstrapped, Config};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    logging::init_tracing(config.is_production());

    info!("Starting price_tracker_rust (stage: {})...", config.stage);

    let Bootstrapped { context, pool } = AppContext::bootstrap(&config).await?;

    // Scheduler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(
        context
            .ingestion
            .clone()
            .run_scheduled(config.ingest_interval(), shutdown_rx),
    );

    // HTTP server
    let app = api::router(context, &config.http_settings());
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("API server listening on http://{}", config.bind_addr);
    info!("Swagger UI at http://{}{}", config.bind_addr, api::docs::SWAGGER_PATH);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!("HTTP server error: {}", e);
    }

    // Stop the scheduler, then release storage
    info!("Shutting down...");
    let _ = shutdown_tx.send(true);
    match tokio::time::timeout(config.shutdown_timeout(), scheduler).await {
        Ok(Ok(())) => info!("Ingestion scheduler stopped"),
        Ok(Err(e)) => error!("Ingestion scheduler panicked: {}", e),
        Err(_) => warn!(
            "Ingestion scheduler did not stop within {:?}",
            config.shutdown_timeout()
        ),
    }

    pool.close().await;
    info!("Database pool closed");

    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
