mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod notify;
mod routes;
mod state;
mod wizard;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notify::Notifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::store::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Podium API v{}", env!("CARGO_PKG_VERSION"));

    if config.llm_api_key.is_none() {
        warn!("LLM_API_KEY is not set — generation requests will fail until it is configured");
    }

    let backend = Arc::new(LlmClient::from_config(&config));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let notifier = Notifier::new(config.webhook_url.clone());
    if config.webhook_url.is_some() {
        info!("Analytics webhook enabled");
    }

    let state = AppState {
        backend,
        sessions: SessionStore::new(),
        notifier,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
