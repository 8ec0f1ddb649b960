// ABOUTME: Shared startup plumbing for the ManagMe server binaries
// ABOUTME: Tracing setup and the CORS layer both servers apply

use axum::http::{header::InvalidHeaderValue, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

pub mod config;

pub use config::{Config, ConfigError};

/// Initializes the global tracing subscriber. RUST_LOG overrides the
/// default `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// CORS layer allowing the configured frontend origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any))
}
