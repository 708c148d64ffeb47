//! Customer identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdError {
    /// The input string is empty.
    #[error("customer id cannot be empty")]
    Empty,
}

/// The key a saved cart is stored under.
///
/// Shopify identifies a signed-in buyer with a global ID such as
/// `gid://shopify/Customer/7012345678`. The checkout widget keeps only the
/// trailing path segment. The service treats whatever it receives as an
/// opaque key: any non-empty string is accepted.
///
/// ## Examples
///
/// ```
/// use saved_cart_core::CustomerId;
///
/// let id = CustomerId::from_buyer_reference("gid://shopify/Customer/123").unwrap();
/// assert_eq!(id.as_str(), "123");
///
/// assert!(CustomerId::from_buyer_reference("gid://shopify/Customer/").is_none());
/// assert!(CustomerId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Wrap a customer key.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn parse(s: &str) -> Result<Self, CustomerIdError> {
        if s.is_empty() {
            return Err(CustomerIdError::Empty);
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive a `CustomerId` from a buyer-identity reference.
    ///
    /// Takes the trailing `/`-separated segment. Returns `None` when that
    /// segment is empty; the buyer is then treated as not signed in.
    #[must_use]
    pub fn from_buyer_reference(reference: &str) -> Option<Self> {
        let segment = reference.rsplit('/').next()?;
        Self::parse(segment).ok()
    }

    /// Returns the customer ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = CustomerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CustomerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CustomerId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CustomerId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CustomerId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buyer_reference_takes_trailing_segment() {
        let id = CustomerId::from_buyer_reference("gid://shopify/Customer/7012345678").unwrap();
        assert_eq!(id.as_str(), "7012345678");
    }

    #[test]
    fn test_from_buyer_reference_without_slashes() {
        let id = CustomerId::from_buyer_reference("123").unwrap();
        assert_eq!(id.as_str(), "123");
    }

    #[test]
    fn test_from_buyer_reference_trailing_slash_is_unresolved() {
        assert!(CustomerId::from_buyer_reference("gid://shopify/Customer/").is_none());
        assert!(CustomerId::from_buyer_reference("").is_none());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(CustomerId::parse(""), Err(CustomerIdError::Empty));
    }

    #[test]
    fn test_parse_is_opaque() {
        assert_eq!(CustomerId::parse("a/b").unwrap().as_str(), "a/b");
        let long = "9".repeat(256);
        assert_eq!(CustomerId::parse(&long).unwrap().as_str(), long);
        assert_eq!(CustomerId::parse(" ").unwrap().as_str(), " ");
    }

    #[test]
    fn test_deserialize_validates() {
        let id: CustomerId = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(id.to_string(), "123");
        assert!(serde_json::from_str::<CustomerId>("\"\"").is_err());
    }
}
