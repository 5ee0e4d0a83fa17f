//! Application State

use std::sync::Arc;

use portfolio_insights::PortfolioAdvisor;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Analytics facade; recomputes every view per request
    pub advisor: Arc<PortfolioAdvisor>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(advisor: PortfolioAdvisor, config: ServerConfig) -> Self {
        Self {
            advisor: Arc::new(advisor),
            config: Arc::new(config),
        }
    }
}
