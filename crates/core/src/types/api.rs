//! JSON payloads exchanged between the checkout widget and the cart service.
//!
//! # Endpoints
//!
//! ```text
//! GET  /api/getCart?customerId=<id>  -> 200 GetCartResponse
//! POST /api/saveCart                 -> 201/200 SaveCartResponse
//!                                       400 MessageBody
//!                                       500 SaveCartFailureBody
//! ```

use serde::{Deserialize, Serialize};

use super::{CartLine, CustomerId, SavedCart};

/// Message returned when a save request is missing a field.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

/// Query string of `GET /api/getCart`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCartQuery {
    /// Customer to look up. Kept optional so a missing parameter is reported
    /// in the body like any other lookup failure.
    pub customer_id: Option<String>,
}

/// Body of `GET /api/getCart`. Always sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCartResponse {
    /// Whether the lookup itself succeeded.
    pub is_success: bool,
    /// The saved cart, or `null` when the customer never saved one.
    #[serde(default)]
    pub data: Option<SavedCart>,
    /// Lookup failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GetCartResponse {
    /// A successful lookup, found or not.
    #[must_use]
    pub const fn found(data: Option<SavedCart>) -> Self {
        Self {
            is_success: true,
            data,
            error: None,
        }
    }

    /// A failed lookup.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/saveCart`.
///
/// Every field is optional on the wire; [`SaveCartRequest::validate`] decides
/// whether the request is complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCartRequest {
    /// Checkout session the save originates from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_token: Option<String>,
    /// Lines to store. An empty list is a valid selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_product: Option<Vec<CartLine>>,
    /// Customer the cart is saved for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Reasons a [`SaveCartRequest`] is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveCartRequestError {
    /// A required field is absent, `null`, or an empty string.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// A save request with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSaveCart {
    /// Checkout session the save originates from.
    pub checkout_token: String,
    /// Lines to store.
    pub products: Vec<CartLine>,
    /// Customer the cart is saved for.
    pub customer_id: CustomerId,
}

impl SaveCartRequest {
    /// Build a complete request, as the widget sends it.
    #[must_use]
    pub fn new(checkout_token: String, products: Vec<CartLine>, customer_id: &CustomerId) -> Self {
        Self {
            checkout_token: Some(checkout_token),
            selected_product: Some(products),
            customer_id: Some(customer_id.as_str().to_owned()),
        }
    }

    /// Check that all three fields are present.
    ///
    /// `customerId` is taken as an opaque key; any non-empty string passes.
    ///
    /// # Errors
    ///
    /// Returns [`SaveCartRequestError::MissingField`] naming the first absent
    /// field.
    pub fn validate(self) -> Result<ValidSaveCart, SaveCartRequestError> {
        let products = self
            .selected_product
            .ok_or(SaveCartRequestError::MissingField("selectedProduct"))?;
        let checkout_token = self
            .checkout_token
            .filter(|t| !t.is_empty())
            .ok_or(SaveCartRequestError::MissingField("checkoutToken"))?;
        let customer_id = self
            .customer_id
            .and_then(|c| CustomerId::parse(&c).ok())
            .ok_or(SaveCartRequestError::MissingField("customerId"))?;

        Ok(ValidSaveCart {
            checkout_token,
            products,
            customer_id,
        })
    }
}

/// Which branch of the upsert a save took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No cart existed; one was created.
    Created,
    /// An existing cart had its products replaced.
    Updated,
}

impl SaveOutcome {
    /// The confirmation message returned to the client.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Created => "Cart created successfully!",
            Self::Updated => "Cart updated successfully!",
        }
    }
}

/// Success body of `POST /api/saveCart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveCartResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The cart as stored after the save.
    pub cart: SavedCart,
}

impl SaveCartResponse {
    /// Build the response for a completed save.
    #[must_use]
    pub fn new(outcome: SaveOutcome, cart: SavedCart) -> Self {
        Self {
            message: outcome.message().to_string(),
            cart,
        }
    }
}

/// Failure body of `POST /api/saveCart` when the store fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCartFailureBody {
    /// Always `false`.
    pub success: bool,
    /// Error description, prefixed with `Error saving cart: -> `.
    pub message: String,
}

impl SaveCartFailureBody {
    /// Wrap a store error description.
    #[must_use]
    pub fn new(error: &impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Error saving cart: -> {error}"),
        }
    }
}

/// A body carrying only a message (400 and 401 responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human-readable description.
    pub message: String,
}

impl MessageBody {
    /// The 400 body for incomplete save requests.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self {
            message: INVALID_REQUEST_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: serde_json::Value) -> SaveCartRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validate_complete_request() {
        let valid = request(json!({
            "checkoutToken": "tok",
            "selectedProduct": [{ "id": "a", "merchandise": { "title": "Shoe" } }],
            "customerId": "123"
        }))
        .validate()
        .unwrap();

        assert_eq!(valid.checkout_token, "tok");
        assert_eq!(valid.customer_id.as_str(), "123");
        assert_eq!(valid.products.len(), 1);
    }

    #[test]
    fn test_validate_accepts_empty_selection() {
        let valid = request(json!({
            "checkoutToken": "tok",
            "selectedProduct": [],
            "customerId": "123"
        }))
        .validate()
        .unwrap();

        assert!(valid.products.is_empty());
    }

    #[test]
    fn test_validate_missing_fields() {
        let missing_products = request(json!({ "checkoutToken": "tok", "customerId": "1" }));
        assert_eq!(
            missing_products.validate(),
            Err(SaveCartRequestError::MissingField("selectedProduct"))
        );

        let null_token = request(json!({
            "checkoutToken": null,
            "selectedProduct": [],
            "customerId": "1"
        }));
        assert_eq!(
            null_token.validate(),
            Err(SaveCartRequestError::MissingField("checkoutToken"))
        );

        let empty_customer = request(json!({
            "checkoutToken": "tok",
            "selectedProduct": [],
            "customerId": ""
        }));
        assert_eq!(
            empty_customer.validate(),
            Err(SaveCartRequestError::MissingField("customerId"))
        );
    }

    #[test]
    fn test_validate_keeps_customer_id_verbatim() {
        let raw_gid = request(json!({
            "checkoutToken": "tok",
            "selectedProduct": [],
            "customerId": "gid://shopify/Customer/1"
        }))
        .validate()
        .unwrap();
        assert_eq!(raw_gid.customer_id.as_str(), "gid://shopify/Customer/1");

        let long_id = "7".repeat(300);
        let long = request(json!({
            "checkoutToken": "tok",
            "selectedProduct": [],
            "customerId": long_id
        }))
        .validate()
        .unwrap();
        assert_eq!(long.customer_id.as_str(), long_id);
    }

    #[test]
    fn test_get_cart_response_shapes() {
        assert_eq!(
            serde_json::to_value(GetCartResponse::found(None)).unwrap(),
            json!({ "isSuccess": true, "data": null })
        );
        assert_eq!(
            serde_json::to_value(GetCartResponse::failed("boom")).unwrap(),
            json!({ "isSuccess": false, "data": null, "error": "boom" })
        );
    }

    #[test]
    fn test_failure_body_message() {
        let body = SaveCartFailureBody::new(&"connection refused");
        assert_eq!(body.message, "Error saving cart: -> connection refused");
        assert!(!body.success);
    }
}
