//! Shopify session-token authentication for `/api/*`.
//!
//! Checkout UI extensions call the backend with
//! `Authorization: Bearer <session token>`. The token is a JWT signed with
//! HS256 using the app's API secret, with the app's API key as `aud`.
//!
//! ```text
//! base64url(header) . base64url(claims) . base64url(HMAC-SHA256(secret, header.claims))
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{Span, debug};

use crate::config::ShopifyAppConfig;
use crate::error::{AppError, set_sentry_customer};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
pub const LEEWAY_SECONDS: i64 = 5;

/// Reasons a session token is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("missing bearer token")]
    Missing,
    #[error("malformed session token: {0}")]
    Malformed(String),
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid session token signature")]
    InvalidSignature,
    #[error("session token expired")]
    Expired,
    #[error("session token not yet valid")]
    NotYetValid,
    #[error("session token issued for a different app")]
    WrongAudience,
}

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Verified claims of a session token.
///
/// Inserted into request extensions by [`require_session_token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer (shop admin URL); not every surface sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Shop domain the request comes from.
    pub dest: String,
    /// App API key the token was issued for.
    pub aud: String,
    /// Customer global ID, present when the buyer is signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Not-before (Unix seconds).
    pub nbf: i64,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Unique token ID.
    pub jti: String,
    /// Session ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Verifies (and, for tests and tooling, mints) session tokens.
#[derive(Clone)]
pub struct SessionTokenVerifier {
    api_key: String,
    api_secret: SecretString,
}

impl std::fmt::Debug for SessionTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenVerifier")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl SessionTokenVerifier {
    /// Create a verifier from the app credentials.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, SessionTokenError> {
        HmacSha256::new_from_slice(self.api_secret.expose_secret().as_bytes())
            .map_err(|e| SessionTokenError::Malformed(e.to_string()))
    }

    /// Verify a token against the clock value `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `SessionTokenError` if the token is malformed, not HS256,
    /// badly signed, outside its validity window, or for another app.
    pub fn verify(&self, token: &str, now: i64) -> Result<SessionClaims, SessionTokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionTokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(SessionTokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| SessionTokenError::Malformed(format!("signature: {e}")))?;

        let signed = token.rsplit_once('.').map_or("", |(signed, _)| signed);

        let mut mac = self.mac()?;
        mac.update(signed.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature)
            .map_err(|_| SessionTokenError::InvalidSignature)?;

        let claims: SessionClaims = decode_segment(payload)?;

        if now > claims.exp + LEEWAY_SECONDS {
            return Err(SessionTokenError::Expired);
        }
        if now + LEEWAY_SECONDS < claims.nbf {
            return Err(SessionTokenError::NotYetValid);
        }
        if claims.aud != self.api_key {
            return Err(SessionTokenError::WrongAudience);
        }

        Ok(claims)
    }

    /// Sign `claims` with the app secret using the same scheme Shopify uses.
    ///
    /// # Errors
    ///
    /// Returns `SessionTokenError::Malformed` if the claims cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionTokenError> {
        let header = TokenHeader {
            alg: "HS256".to_string(),
            typ: Some("JWT".to_string()),
        };
        let signed = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);

        let mut mac = self.mac()?;
        mac.update(signed.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signed}.{signature}"))
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, SessionTokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| SessionTokenError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionTokenError::Malformed(e.to_string()))
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, SessionTokenError> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| SessionTokenError::Malformed(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Extract the token from an `Authorization: Bearer ...` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that rejects `/api/*` requests without a valid session token.
///
/// On success the [`SessionClaims`] are added to the request extensions and
/// the shop domain is attached to the tracing span and the Sentry scope.
pub async fn require_session_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(SessionTokenError::Missing)?;

    let claims = state
        .session_tokens()
        .verify(token, Utc::now().timestamp())?;

    Span::current().record("shop", claims.dest.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("shop", &claims.dest);
    });
    if let Some(customer_gid) = &claims.sub {
        set_sentry_customer(customer_gid);
    }
    debug!(shop = %claims.dest, "Session token verified");

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
