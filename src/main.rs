mod cli;
mod config;
mod framer;
mod http;
mod ingest;
mod net;
mod reading;
mod serial;
mod snapshot;
mod state;
mod status;
mod store;

use crate::config::Config;
use crate::ingest::TelemetryIngestor;
use crate::state::BridgeState;
use anyhow::{Context, Result};
use clap::Parser;

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,amp_bridge=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing()?;
    let config = Config::from_env(&args)?;

    let port_name = match &config.serial_port {
        Some(port) => port.clone(),
        None => serial::discover_port()?,
    };
    let source = serial::open(&port_name, config.baud_rate)?;

    let state = BridgeState::new(config.thresholds);
    tracing::info!(
        running_min = config.thresholds.running_min(),
        malfunction_min = config.thresholds.malfunction_min(),
        "amperage thresholds configured"
    );

    let ingestor = TelemetryIngestor::new(&state, config.ingest.clone());
    let mut ingest_handle = tokio::spawn(async move { ingestor.run(source).await });

    let host = config.http_host.clone().unwrap_or_else(net::default_listen_host);
    let bind = format!("{}:{}", host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {bind}"))?;
    tracing::info!(bind=%bind, port=%port_name, "amp-bridge HTTP listening");
    let app = http::router(state);
    let mut http_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
        res = &mut ingest_handle => {
            let err = match res {
                Ok(Ok(())) => anyhow::anyhow!("ingestion stopped"),
                Ok(Err(err)) => anyhow::Error::new(err),
                Err(err) => anyhow::Error::new(err).context("ingestion task panicked"),
            };
            tracing::error!(error=%err, "telemetry ingestion exited");
            Err(err)
        }
        res = &mut http_handle => {
            let err = match res {
                Ok(Ok(())) => anyhow::anyhow!("HTTP server stopped"),
                Ok(Err(err)) => anyhow::Error::new(err).context("HTTP server failed"),
                Err(err) => anyhow::Error::new(err).context("HTTP task panicked"),
            };
            tracing::error!(error=%err, "HTTP server exited");
            Err(err)
        }
    }
}
