mod admin;
mod config;
mod db;
mod errors;
mod intake;
mod models;
mod notify;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::notify::Notifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FileStore;

// Three attachments of up to 20 MiB each plus the text fields.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting candidatures API v{} (deadline {})",
        env!("CARGO_PKG_VERSION"),
        config.date_limite
    );

    let db = create_pool(&config.database_url).await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let files = FileStore::new(&config.upload_dir);
    info!("Upload directory ready at {}", config.upload_dir.display());

    let notifier = Arc::new(Notifier::from_config(&config)?);

    let state = AppState::new(db, config.clone(), files, notifier);

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
