mod anthropic;
mod codec;
mod config;
mod error;
mod models;
mod pipeline;
mod prompt;
mod render;
mod response;
mod routes;
mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use crate::anthropic::AnthropicClient;
use crate::config::Config;
use crate::routes::{router, AppState};
use crate::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    if config.api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY is not set, generation requests will fail with an auth error");
    }
    tracing::info!(model = %config.model, max_tokens = config.max_tokens, "Using model");

    let state = AppState {
        sessions: SessionStore::with_ttl(chrono::Duration::minutes(config.session_ttl_minutes)),
        model: Arc::new(AnthropicClient::new(&config)),
    };
    let app = router(state, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting FITLAB server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;
    Ok(())
}
