//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Route handlers return `Result<T, AppError>`.
//!
//! Response bodies are part of the widget contract:
//!
//! ```text
//! 400 {"message": "Invalid request"}
//! 401 {"message": "<reason>"}
//! 500 {"success": false, "message": "Error saving cart: -> <error>"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use saved_cart_core::{MessageBody, SaveCartFailureBody};

use crate::db::RepositoryError;
use crate::middleware::SessionTokenError;

/// Application-level error type for the cart store service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Save request was incomplete or not valid JSON.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The store failed while saving.
    #[error("Save failed: {0}")]
    SaveFailed(#[from] RepositoryError),

    /// Missing or invalid session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] SessionTokenError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidRequest(reason) => {
                tracing::debug!(%reason, "Rejected save request");
                (StatusCode::BAD_REQUEST, Json(MessageBody::invalid_request())).into_response()
            }
            Self::Unauthorized(err) => {
                tracing::warn!(error = %err, "Rejected session token");
                let body = MessageBody {
                    message: err.to_string(),
                };
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            Self::SaveFailed(ref err) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(SaveCartFailureBody::new(err)),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer global ID.
///
/// Called once a session token names a signed-in buyer.
pub fn set_sentry_customer(customer_gid: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_gid.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
