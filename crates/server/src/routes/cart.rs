//! Saved cart API handlers.
//!
//! Both endpoints sit behind session-token authentication. `getCart` never
//! fails at the HTTP level: lookup problems are reported inside the body so
//! the widget can treat them like an empty saved cart.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::{instrument, warn};

use saved_cart_core::{
    CustomerId, GetCartQuery, GetCartResponse, SaveCartRequest, SaveCartResponse, SaveOutcome,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::SessionClaims;
use crate::state::AppState;

/// `GET /api/getCart?customerId=<id>`
#[instrument(skip_all, fields(shop = %claims.dest))]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    query: std::result::Result<Query<GetCartQuery>, QueryRejection>,
) -> Json<GetCartResponse> {
    let customer_id = match lookup_key(query) {
        Ok(customer_id) => customer_id,
        Err(error) => {
            warn!(%error, "Rejected cart lookup");
            return Json(GetCartResponse::failed(error));
        }
    };

    match state.saved_carts().get_saved_cart(&customer_id).await {
        Ok(cart) => Json(GetCartResponse::found(cart)),
        Err(e) => {
            warn!(customer_id = %customer_id, error = %e, "Failed to look up saved cart");
            Json(GetCartResponse::failed(e.to_string()))
        }
    }
}

/// Pull the customer key out of the query string. Any non-empty value is used as is.
fn lookup_key(
    query: std::result::Result<Query<GetCartQuery>, QueryRejection>,
) -> std::result::Result<CustomerId, String> {
    let Query(query) = query.map_err(|e| e.body_text())?;
    let raw = query
        .customer_id
        .ok_or_else(|| "customerId is required".to_string())?;
    CustomerId::parse(&raw).map_err(|e| e.to_string())
}

/// `POST /api/saveCart`
///
/// Returns 201 when the customer's cart is created and 200 when its products
/// are replaced.
#[instrument(skip_all, fields(shop = %claims.dest))]
pub async fn save_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    payload: std::result::Result<Json<SaveCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveCartResponse>)> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let request = request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let customer_id = request.customer_id.to_string();
    let (outcome, cart) = state.saved_carts().save_cart(request).await?;

    add_breadcrumb(
        "cart",
        outcome.message(),
        Some(&[("customer_id", customer_id.as_str())]),
    );

    let status = match outcome {
        SaveOutcome::Created => StatusCode::CREATED,
        SaveOutcome::Updated => StatusCode::OK,
    };

    Ok((status, Json(SaveCartResponse::new(outcome, cart))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_key_requires_customer_id() {
        let result = lookup_key(Ok(Query(GetCartQuery { customer_id: None })));
        assert_eq!(result.unwrap_err(), "customerId is required");
    }

    #[test]
    fn test_lookup_key_parses_customer_id() {
        let result = lookup_key(Ok(Query(GetCartQuery {
            customer_id: Some("123".to_string()),
        })));
        assert_eq!(result.unwrap().as_str(), "123");
    }

    #[test]
    fn test_lookup_key_is_opaque() {
        let result = lookup_key(Ok(Query(GetCartQuery {
            customer_id: Some("gid://shopify/Customer/1".to_string()),
        })));
        assert_eq!(result.unwrap().as_str(), "gid://shopify/Customer/1");
    }

    #[test]
    fn test_lookup_key_rejects_empty() {
        let result = lookup_key(Ok(Query(GetCartQuery {
            customer_id: Some(String::new()),
        })));
        assert!(result.is_err());
    }
}
