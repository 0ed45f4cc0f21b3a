use std::sync::Arc;

use anyhow::Context;
use axum_video_stream::config::Config;
use axum_video_stream::server;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log).with_context(|| format!("invalid log filter {:?}", config.log))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let service = config.service().context("could not set up the stream service")?;
    let app = server::router(Arc::new(service), config.auth_policy());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("could not bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, policy = ?config.chunk_policy(), "serving video stream");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
