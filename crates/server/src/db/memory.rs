//! In-memory saved cart store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use saved_cart_core::{CartLine, CustomerId, SavedCart, SavedCartId};

use super::{RepositoryError, SavedCartStore};

#[derive(Default)]
struct MemoryInner {
    carts: HashMap<CustomerId, SavedCart>,
    next_id: i32,
}

/// Saved cart store that keeps everything in a process-local map.
#[derive(Default)]
pub struct MemorySavedCartStore {
    inner: RwLock<MemoryInner>,
}

impl MemorySavedCartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved carts held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.carts.len()
    }

    /// Whether no cart has been saved yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.carts.is_empty()
    }
}

#[async_trait]
impl SavedCartStore for MemorySavedCartStore {
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SavedCart>, RepositoryError> {
        Ok(self.inner.read().await.carts.get(customer_id).cloned())
    }

    async fn update_products(
        &self,
        customer_id: &CustomerId,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError> {
        let mut inner = self.inner.write().await;
        let cart = inner
            .carts
            .get_mut(customer_id)
            .ok_or(RepositoryError::NotFound)?;

        cart.products = products.to_vec();
        cart.updated_at = Utc::now();
        Ok(cart.clone())
    }

    async fn create(
        &self,
        customer_id: &CustomerId,
        checkout_token: &str,
        products: &[CartLine],
    ) -> Result<SavedCart, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.carts.contains_key(customer_id) {
            return Err(RepositoryError::Conflict(format!(
                "customer {customer_id} already has a saved cart"
            )));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let cart = SavedCart {
            id: SavedCartId::new(inner.next_id),
            customer_id: customer_id.clone(),
            checkout_token: checkout_token.to_owned(),
            products: products.to_vec(),
            created_at: now,
            updated_at: now,
        };
        inner.carts.insert(customer_id.clone(), cart.clone());
        Ok(cart)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
