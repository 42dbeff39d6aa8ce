//! notes-server: HTTP API server for the shared notes service
//!
//! This crate provides:
//! - Bearer token issuance and validation (`token`)
//! - The request gate that authenticates, authorizes, and applies every note
//!   operation (`gate`)
//! - REST endpoints for accounts and notes (`routes`)
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_server::{build_app, config::ServerConfig, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let app = build_app(AppState::new(config.clone()))?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod token;

use axum::Router;
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use auth::AuthenticatedUser;
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use gate::RequestGate;
pub use state::AppState;
pub use token::{Clock, ManualClock, SystemClock, TokenError, TokenService};

// Re-export dependent crates
pub use notes_core;
pub use notes_store;

/// Build the router with its full middleware stack.
pub fn build_app(state: AppState) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&state.config().cors_allowed_origins)?;

    Ok(routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Build CORS layer from configuration.
fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    // Parse comma-separated origins
    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("invalid origin {:?}", origin),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(layer.allow_origin(origins))
}
