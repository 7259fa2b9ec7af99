//! Application state shared across all route handlers.
//!
//! AppState holds the storage manager and the provisioned-token registry.
//! It is passed to handlers via axum's State extractor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use querypad_core::AuthUser;
use querypad_storage::StorageManager;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Storage manager, fixed on one adapter for the process lifetime.
    pub store: Arc<StorageManager>,
    /// Bearer token -> authenticated user. Tokens are provisioned by the
    /// external auth provider (or the startup bootstrap); this registry only
    /// resolves them.
    tokens: Arc<Mutex<HashMap<String, AuthUser>>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState over the given storage manager.
    pub fn new(store: StorageManager) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(Mutex::new(HashMap::new())),
            start_time: Instant::now(),
        }
    }

    /// Register a provisioned bearer token for `user`.
    pub fn register_token(&self, token: impl Into<String>, user: AuthUser) {
        self.tokens
            .lock()
            .expect("token registry poisoned")
            .insert(token.into(), user);
    }

    /// Resolve a bearer token to its user, if provisioned.
    pub fn resolve_token(&self, token: &str) -> Option<AuthUser> {
        self.tokens
            .lock()
            .expect("token registry poisoned")
            .get(token)
            .cloned()
    }
}
