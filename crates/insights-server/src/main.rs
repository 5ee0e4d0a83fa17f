//! portfolio-insights HTTP Server
//!
//! Axum-based server exposing the wallet analytics core: insight cards,
//! advisory findings, risk profile, health score, timeline and the chat
//! system prompt.

mod app;
mod config;
mod handlers;
mod prompt;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_insights::PortfolioAdvisor;

use crate::app::build_router;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    if config.allowed_origins.is_empty() {
        tracing::warn!("ALLOWED_ORIGINS not set - CORS allows any origin");
    }

    let addr = config.bind_addr.clone();
    let state = AppState::new(PortfolioAdvisor::default(), config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("portfolio-insights server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  POST /api/insights            - Insight cards");
    tracing::info!("  POST /api/insights/advisory   - Advisory findings");
    tracing::info!("  POST /api/timeline            - Activity timeline");
    tracing::info!("  POST /api/risk-profile        - Risk tier");
    tracing::info!("  POST /api/portfolio-health    - Health score");
    tracing::info!("  POST /api/portfolio-analysis  - All of the above");
    tracing::info!("  POST /api/chat/context        - Advisory system prompt");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
