//! Cart line references.
//!
//! A cart line is copied verbatim from the live checkout cart into a saved
//! cart and back. Only `id` and `merchandise.title` are read here; every other
//! field Shopify sends (quantity, cost, attributes, image, ...) is carried
//! along untouched in the flattened `extra` maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single line of a checkout cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identifier, unique within the list it came from.
    pub id: String,
    /// The variant this line refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchandise: Option<Merchandise>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The merchandise (product variant) behind a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchandise {
    /// Display title of the variant.
    #[serde(default)]
    pub title: String,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartLine {
    /// Create a line with just an ID and a merchandise title.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            merchandise: Some(Merchandise {
                title: title.into(),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// The merchandise title shown next to the line's checkbox.
    #[must_use]
    pub fn title(&self) -> &str {
        self.merchandise.as_ref().map_or("", |m| m.title.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "gid://shopify/CartLine/1",
            "quantity": 2,
            "merchandise": {
                "title": "Shoe",
                "id": "gid://shopify/ProductVariant/9",
                "image": { "url": "https://cdn.example/shoe.png" }
            },
            "attributes": []
        });

        let line: CartLine = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(line.id, "gid://shopify/CartLine/1");
        assert_eq!(line.title(), "Shoe");
        assert_eq!(serde_json::to_value(&line).unwrap(), raw);
    }

    #[test]
    fn test_line_without_merchandise() {
        let line: CartLine = serde_json::from_value(json!({ "id": "a" })).unwrap();
        assert_eq!(line.title(), "");
        assert_eq!(serde_json::to_value(&line).unwrap(), json!({ "id": "a" }));
    }

    #[test]
    fn test_new_builds_titled_line() {
        let line = CartLine::new("a", "Shoe");
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({ "id": "a", "merchandise": { "title": "Shoe" } })
        );
    }
}
