//! Integration tests for the saved cart service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router and widget tests
//! cargo test -p saved-cart-integration-tests
//!
//! # Also run tests against a live server
//! SAVED_CART_BASE_URL=http://localhost:3000 \
//! SHOPIFY_API_KEY=... SHOPIFY_API_SECRET=... \
//!     cargo test -p saved-cart-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `saved_cart_api` - HTTP contract of `/api/getCart` and `/api/saveCart`
//! - `widget_end_to_end` - Checkout widget talking to a real server socket
//! - `live_server` - The same contract against a deployed server

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use saved_cart_server::config::ShopifyAppConfig;
use saved_cart_server::db::{MemorySavedCartStore, SavedCartStore};
use saved_cart_server::middleware::{SessionClaims, SessionTokenVerifier};
use saved_cart_server::state::AppState;
use saved_cart_widget::{ClientError, SessionToken, SessionTokenProvider};

/// App API key used as the session-token audience in tests.
pub const API_KEY: &str = "test-app-key";

/// App API secret used to sign session tokens in tests.
pub const API_SECRET: &str = "9c1e4b7a2f6d08e35b7c91a4d2f0e6b8";

/// Shop domain carried in test session tokens.
pub const SHOP: &str = "saved-cart-test.myshopify.com";

/// Credentials matching [`API_KEY`] and [`API_SECRET`].
#[must_use]
pub fn shopify_config() -> ShopifyAppConfig {
    ShopifyAppConfig {
        api_key: API_KEY.to_string(),
        api_secret: SecretString::from(API_SECRET),
    }
}

/// Claims of a session token valid for the next minute.
#[must_use]
pub fn session_claims(customer_gid: Option<&str>) -> SessionClaims {
    let now = Utc::now().timestamp();
    SessionClaims {
        iss: Some(format!("https://{SHOP}/admin")),
        dest: format!("https://{SHOP}"),
        aud: API_KEY.to_string(),
        sub: customer_gid.map(String::from),
        exp: now + 60,
        nbf: now - 1,
        iat: now - 1,
        jti: format!("jti-{now}"),
        sid: None,
    }
}

/// Decoded HTTP response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body parsed as JSON; `Value::String` for non-JSON bodies.
    pub body: Value,
}

/// The application router with test credentials.
pub struct TestContext {
    pub verifier: SessionTokenVerifier,
    router: Router,
}

impl TestContext {
    /// Router over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SavedCartStore>) -> Self {
        let config = shopify_config();
        let state = AppState::new(store, &config);
        Self {
            verifier: SessionTokenVerifier::new(&config),
            router: saved_cart_server::app(state),
        }
    }

    /// Router over a fresh in-memory store, with a handle to inspect it.
    #[must_use]
    pub fn memory() -> (Self, Arc<MemorySavedCartStore>) {
        let store = Arc::new(MemorySavedCartStore::new());
        let ctx = Self::new(Arc::clone(&store) as Arc<dyn SavedCartStore>);
        (ctx, store)
    }

    /// A valid session token for a signed-in buyer.
    ///
    /// # Panics
    ///
    /// Panics if the claims cannot be signed.
    #[must_use]
    pub fn session_token(&self) -> String {
        self.sign(&session_claims(Some("gid://shopify/Customer/123")))
    }

    /// Sign arbitrary claims with the test secret.
    ///
    /// # Panics
    ///
    /// Panics if the claims cannot be signed.
    #[must_use]
    pub fn sign(&self, claims: &SessionClaims) -> String {
        self.verifier.sign(claims).expect("Failed to sign session token")
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router error");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET /api/getCart?customerId=...` with a valid token. The ID is
    /// form-encoded.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get_cart(&self, customer_id: &str) -> TestResponse {
        let encoded: String =
            url::form_urlencoded::byte_serialize(customer_id.as_bytes()).collect();
        let request = Request::get(format!("/api/getCart?customerId={encoded}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.session_token()))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// `POST /api/saveCart` with a valid token and a raw body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn save_cart_raw(&self, body: impl Into<Body>) -> TestResponse {
        let request = Request::post("/api/saveCart")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.session_token()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// `POST /api/saveCart` with a valid token and a JSON body.
    pub async fn save_cart(&self, body: &Value) -> TestResponse {
        self.save_cart_raw(body.to_string()).await
    }

    /// Serve the router on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        addr
    }
}

/// Session token provider that signs a fresh test token per call.
pub struct SigningTokenProvider {
    verifier: SessionTokenVerifier,
    customer_gid: String,
}

impl SigningTokenProvider {
    #[must_use]
    pub fn new(customer_gid: impl Into<String>) -> Self {
        Self {
            verifier: SessionTokenVerifier::new(&shopify_config()),
            customer_gid: customer_gid.into(),
        }
    }
}

#[async_trait]
impl SessionTokenProvider for SigningTokenProvider {
    async fn get(&self) -> Result<SessionToken, ClientError> {
        self.verifier
            .sign(&session_claims(Some(&self.customer_gid)))
            .map(SessionToken::new)
            .map_err(|e| ClientError::SessionToken(e.to_string()))
    }
}
