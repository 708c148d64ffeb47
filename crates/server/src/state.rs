//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ShopifyAppConfig;
use crate::db::SavedCartStore;
use crate::middleware::SessionTokenVerifier;
use crate::services::SavedCartService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the saved cart service and the session-token verifier.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    saved_carts: SavedCartService,
    session_tokens: SessionTokenVerifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Saved cart storage backend
    /// * `shopify` - App credentials used to verify session tokens
    #[must_use]
    pub fn new(store: Arc<dyn SavedCartStore>, shopify: &ShopifyAppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                saved_carts: SavedCartService::new(store),
                session_tokens: SessionTokenVerifier::new(shopify),
            }),
        }
    }

    /// Get a reference to the saved cart service.
    #[must_use]
    pub fn saved_carts(&self) -> &SavedCartService {
        &self.inner.saved_carts
    }

    /// Get a reference to the session-token verifier.
    #[must_use]
    pub fn session_tokens(&self) -> &SessionTokenVerifier {
        &self.inner.session_tokens
    }
}
