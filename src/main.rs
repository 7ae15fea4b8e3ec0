//! Ticket lifecycle server
//!
//! Opens the sled database named by `TICKETS_DB_PATH` and serves the ticket
//! HTTP API until Ctrl+C.
use anyhow::Context;
use std::sync::Arc;
use ticket_lifecycle::{config::Config, http, service::TicketService, sled_store::SledStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).context("invalid RUST_LOG filter")?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(SledStore::open(&config.db_path)?);
    tracing::info!(db = %config.db_path.display(), "ticket store opened");

    let service = Arc::new(TicketService::new(store.clone()));
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(addr = %config.bind_addr(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal(tokio::signal::ctrl_c()))
        .await?;

    store.flush()?;
    Ok(())
}
