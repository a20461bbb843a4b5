mod config;
mod entries;
mod errors;
mod forms;
mod llm_client;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::entries::enhancement::LlmTextEnhancer;
use crate::entries::sessions::{SessionStore, SWEEP_INTERVAL};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let mut llm = LlmClient::new(config.anthropic_api_key.clone())?;
    if let Some(url) = &config.anthropic_api_url {
        info!("Using Messages endpoint override: {url}");
        llm = llm.with_api_url(url.clone());
    }
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    if config.strict_entry_types {
        info!("Strict entry types enabled: unknown tags are rejected");
    }

    // Editor sessions, with idle ones swept in the background
    let sessions = SessionStore::new(config.session_idle_ttl);
    sessions.spawn_sweeper(SWEEP_INTERVAL);
    info!(
        "Editor sessions expire after {}s idle",
        config.session_idle_ttl.as_secs()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        enhancer: Arc::new(LlmTextEnhancer(llm)),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
