//! `PostgreSQL` saved cart repository.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use saved_cart_core::{CartLine, CustomerId, SavedCart, SavedCartId};

use super::{RepositoryError, SavedCartStore};

const SAVED_CART_COLUMNS: &str = "id, customer_id, checkout_token, products, created_at, updated_at";

/// Row as read from `saved_cart`.
#[derive(sqlx::FromRow)]
struct SavedCartRow {
    id: SavedCartId,
    customer_id: String,
    checkout_token: String,
    products: Json<Vec<CartLine>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SavedCartRow> for SavedCart {
    type Error = RepositoryError;

    fn try_from(row: SavedCartRow) -> Result<Self, Self::Error> {
        let customer_id = CustomerId::parse(&row.customer_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer_id in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            customer_id,
            checkout_token: row.checkout_token,
            products: row.products.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Saved cart store backed by the `saved_cart` table.
#[derive(Clone)]
pub struct PgSavedCartStore {
    pool: PgPool,
}

impl PgSavedCartStore {
    /// Create a new store on top of a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedCartStore for PgSavedCartStore {
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SavedCart>, RepositoryError> {
        let row = sqlx::query_as::<_, SavedCartRow>(&format!(
            "SELECT {SAVED_CART_COLUMNS} FROM saved_cart WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SavedCart::try_from).transpose()
    }

    #[instrument(skip(self, products), fields(customer_id = %customer_id, lines = products.len()))]
    async fn update_products(
        &self,
        customer_id: &CustomerId,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError> {
        let row = sqlx::query_as::<_, SavedCartRow>(&format!(
            r"
            UPDATE saved_cart
            SET products = $2, updated_at = now()
            WHERE customer_id = $1
            RETURNING {SAVED_CART_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(Json(products))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        SavedCart::try_from(row)
    }

    #[instrument(skip(self, checkout_token, products), fields(customer_id = %customer_id, lines = products.len()))]
    async fn create(
        &self,
        customer_id: &CustomerId,
        checkout_token: &str,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError> {
        let row = sqlx::query_as::<_, SavedCartRow>(&format!(
            r"
            INSERT INTO saved_cart (customer_id, checkout_token, products)
            VALUES ($1, $2, $3)
            RETURNING {SAVED_CART_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(checkout_token)
        .bind(Json(products))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "customer {customer_id} already has a saved cart"
                ));
            }
            RepositoryError::Database(e)
        })?;

        SavedCart::try_from(row)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(customer_id: &str) -> SavedCartRow {
        SavedCartRow {
            id: SavedCartId::new(1),
            customer_id: customer_id.to_string(),
            checkout_token: "tok".to_string(),
            products: Json(vec![CartLine::new("a", "Shoe")]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_saved_cart() {
        let cart = SavedCart::try_from(row("123")).unwrap();
        assert_eq!(cart.customer_id.as_str(), "123");
        assert_eq!(cart.products, vec![CartLine::new("a", "Shoe")]);
    }

    #[test]
    fn test_row_with_corrupt_customer_id() {
        let result = SavedCart::try_from(row(""));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
