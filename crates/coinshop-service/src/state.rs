//! Application state.

use std::sync::Arc;

use coinshop_store::Store;

use crate::auth::TokenService;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
pub struct AppState<S> {
    /// The storage backend.
    pub store: Arc<S>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Access token issuer and verifier.
    pub tokens: TokenService,
}

impl<S: Store> AppState<S> {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_seconds);
        Self {
            store,
            config,
            tokens,
        }
    }
}
