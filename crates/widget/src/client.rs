//! Seams between the widget and the outside world.
//!
//! The runtime needs a fresh session token for every request and a client
//! for the two cart store endpoints. Both are traits so the host (or a test)
//! can supply its own.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use saved_cart_core::{CustomerId, GetCartResponse, SaveCartRequest, SaveCartResponse};

use crate::config::WidgetConfig;

/// Errors from talking to the cart store service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("rejected ({status}): {body}")]
    Rejected {
        /// Response status.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// Failed to parse the response body.
    #[error("parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Failed to build an endpoint URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The host could not provide a session token.
    #[error("session token unavailable: {0}")]
    SessionToken(String),
}

/// A short-lived bearer credential for one request.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Issues session tokens. Called once per request.
#[async_trait]
pub trait SessionTokenProvider: Send + Sync {
    async fn get(&self) -> Result<SessionToken, ClientError>;
}

/// The two cart store endpoints.
#[async_trait]
pub trait CartStoreClient: Send + Sync {
    /// `GET /api/getCart`
    async fn get_cart(
        &self,
        token: &SessionToken,
        customer_id: &CustomerId,
    ) -> Result<GetCartResponse, ClientError>;

    /// `POST /api/saveCart`
    async fn save_cart(
        &self,
        token: &SessionToken,
        request: &SaveCartRequest,
    ) -> Result<SaveCartResponse, ClientError>;
}

/// [`CartStoreClient`] over HTTP.
#[derive(Clone)]
pub struct HttpCartStoreClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCartStoreClient {
    /// Create a client for the service named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &WidgetConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &WidgetConfig) -> Self {
        Self {
            client,
            base_url: config.app_url.clone(),
        }
    }

    fn get_cart_url(&self, customer_id: &CustomerId) -> Result<Url, ClientError> {
        let mut url = self.base_url.join("api/getCart")?;
        url.query_pairs_mut()
            .append_pair("customerId", customer_id.as_str());
        Ok(url)
    }

    fn save_cart_url(&self) -> Result<Url, ClientError> {
        Ok(self.base_url.join("api/saveCart")?)
    }

    /// Check the status, then decode the body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Rejected { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CartStoreClient for HttpCartStoreClient {
    #[instrument(skip(self, token), fields(customer_id = %customer_id))]
    async fn get_cart(
        &self,
        token: &SessionToken,
        customer_id: &CustomerId,
    ) -> Result<GetCartResponse, ClientError> {
        let response = self
            .client
            .get(self.get_cart_url(customer_id)?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    #[instrument(skip_all)]
    async fn save_cart(
        &self,
        token: &SessionToken,
        request: &SaveCartRequest,
    ) -> Result<SaveCartResponse, ClientError> {
        let response = self
            .client
            .post(self.save_cart_url()?)
            .bearer_auth(token.expose())
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpCartStoreClient {
        let config = WidgetConfig::new(Url::parse(base).unwrap());
        HttpCartStoreClient::new(&config).unwrap()
    }

    #[test]
    fn test_get_cart_url_encodes_customer_id() {
        let client = client("https://app.example.com");
        let customer_id = CustomerId::parse("12 3&x").unwrap();
        assert_eq!(
            client.get_cart_url(&customer_id).unwrap().as_str(),
            "https://app.example.com/api/getCart?customerId=12+3%26x"
        );
    }

    #[test]
    fn test_save_cart_url_keeps_base_path() {
        let client = client("https://app.example.com/proxy");
        assert_eq!(
            client.save_cart_url().unwrap().as_str(),
            "https://app.example.com/proxy/api/saveCart"
        );
    }

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken::new("eyJhbGciOi.secret.sig");
        assert_eq!(format!("{token:?}"), "SessionToken([REDACTED])");
        assert_eq!(token.expose(), "eyJhbGciOi.secret.sig");
    }

    #[test]
    fn test_rejected_display() {
        let err = ClientError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"message":"Invalid request"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"rejected (400 Bad Request): {"message":"Invalid request"}"#
        );
    }
}
