//! Saved cart persistence.
//!
//! # Table: `saved_cart`
//!
//! One row per customer, keyed by the unique `customer_id`. `products` holds
//! the saved cart lines as JSONB exactly as the widget sent them.
//!
//! # Stores
//!
//! - [`PgSavedCartStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemorySavedCartStore`] - in-process map (tests and local runs)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p saved-cart-cli -- migrate
//! ```

pub mod memory;
pub mod saved_carts;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use saved_cart_core::{CartLine, CustomerId, SavedCart};

pub use memory::MemorySavedCartStore;
pub use saved_carts::PgSavedCartStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second cart for the same customer).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Keyed storage of one [`SavedCart`] per customer.
///
/// The upsert built on top of this (find, then update or create) is not
/// atomic; two concurrent first saves for one customer surface as
/// [`RepositoryError::Conflict`] on the second `create`.
#[async_trait]
pub trait SavedCartStore: Send + Sync {
    /// Look up the cart saved for `customer_id`.
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SavedCart>, RepositoryError>;

    /// Replace the products of an existing cart, leaving every other field.
    ///
    /// Returns [`RepositoryError::NotFound`] if the customer has no cart.
    async fn update_products(
        &self,
        customer_id: &CustomerId,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError>;

    /// Create a cart for a customer who has none.
    async fn create(
        &self,
        customer_id: &CustomerId,
        checkout_token: &str,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// Connections go back to the pool as soon as each query finishes, so a
/// request never holds one past its own store calls.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
