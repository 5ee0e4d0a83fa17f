//! Server Configuration
//!
//! Read from the environment (and `.env`, loaded in `main`).

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Timeline events included in the advisory prompt by default
pub const DEFAULT_TIMELINE_CONTEXT_LIMIT: usize = 6;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,

    /// Allowed CORS origins; empty or `*` allows any origin
    pub allowed_origins: Vec<String>,

    /// Timeline events rendered into the advisory prompt
    pub timeline_context_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            allowed_origins: Vec::new(),
            timeline_context_limit: DEFAULT_TIMELINE_CONTEXT_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        let timeline_context_limit = std::env::var("TIMELINE_CONTEXT_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeline_context_limit);

        Self {
            bind_addr,
            allowed_origins,
            timeline_context_limit,
        }
    }

    /// CORS layer for the configured origins
    pub fn cors_layer(&self) -> CorsLayer {
        let origin = if self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            AllowOrigin::list(
                self.allowed_origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
