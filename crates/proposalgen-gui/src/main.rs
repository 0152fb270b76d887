use anyhow::{Context, Result};
use axum::Router;
use proposalgen_core::{MODEL_ID, SecretsLoader, TelemetryOptions, init_telemetry};
use proposalgen_gui::{config::AppConfig, routes::build_router, state::AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    init_telemetry(TelemetryOptions {
        with_ansi: config.ansi_logs,
        ..TelemetryOptions::default()
    })?;

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "failed to read .env file");
        }
    }

    // Every secret must be present before the form is served.
    let secrets = SecretsLoader::load(None).context("failed to load secrets")?;
    let state = AppState::from_secrets(&secrets)?;

    let app: Router = build_router(state);

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(address = %config.listen_addr, model = MODEL_ID, "proposalgen-gui listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            error!(error = %err, "server shutdown with error");
            err
        })?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            stream.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
