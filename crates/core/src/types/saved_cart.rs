//! The persisted per-customer saved cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartLine, CustomerId, SavedCartId};

/// A customer's saved cart.
///
/// There is at most one per [`CustomerId`]. Saving again replaces `products`
/// wholesale; `checkout_token` keeps the value from the first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCart {
    /// Store-assigned row key.
    pub id: SavedCartId,
    /// The customer this cart belongs to (unique).
    pub customer_id: CustomerId,
    /// Checkout session that created the record. Informational only.
    pub checkout_token: String,
    /// Saved lines, in the order they were submitted.
    pub products: Vec<CartLine>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When `products` was last replaced.
    pub updated_at: DateTime<Utc>,
}
