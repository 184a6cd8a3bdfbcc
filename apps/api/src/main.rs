mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::composer::MODEL;
use crate::analysis::session::SessionRegistry;
use crate::config::Config;
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
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aurelius API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
    );
    info!(
        "LLM client initialized (model: {MODEL}, endpoint: {})",
        config.anthropic_api_url
    );

    // Demo sessions live in memory only; settled ones are swept after the TTL
    let sessions = SessionRegistry::with_ttl(chrono::Duration::seconds(config.session_ttl_secs));
    spawn_session_sweeper(sessions.clone(), config.session_ttl_secs);

    // Build app state
    let state = AppState {
        generator: Arc::new(llm),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the marketing site origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops expired sessions so an idle server does not hold old reports.
fn spawn_session_sweeper(sessions: SessionRegistry, ttl_secs: i64) {
    let period = std::time::Duration::from_secs(ttl_secs.unsigned_abs().max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let swept = sessions.sweep_expired(chrono::Utc::now()).await;
            if swept > 0 {
                info!("Swept {swept} expired demo sessions");
            }
        }
    });
}
