//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::{CredentialStore, NoteStore};

use crate::config::ServerConfig;
use crate::gate::RequestGate;
use crate::token::{Clock, SystemClock, TokenService};

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Request gate owning the stores and the token service.
    gate: Arc<RequestGate>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state with empty stores and the system clock.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create new application state whose tokens follow `clock`.
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // Bounded by MAX_TOKEN_TTL_SECS at load time.
        let ttl = chrono::Duration::seconds(config.token_ttl_secs as i64);
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), ttl, clock);
        let gate = RequestGate::new(
            Arc::new(CredentialStore::new()),
            Arc::new(NoteStore::new()),
            Arc::new(tokens),
            config.require_known_subject,
        );

        Self {
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the request gate.
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
