//! HTTP middleware stack for the cart store service.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (unique ID per request, echoed in `x-request-id`)
//! 4. CORS (`/api/*` only; answers preflight before authentication)
//! 5. Session token (`/api/*` only; Shopify bearer token verification)

pub mod request_id;
pub mod session_token;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session_token::{
    SessionClaims, SessionTokenError, SessionTokenVerifier, require_session_token,
};
