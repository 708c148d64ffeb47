//! Saved cart read and upsert.

use std::sync::Arc;

use tracing::{info, instrument};

use saved_cart_core::{CustomerId, SaveOutcome, SavedCart, ValidSaveCart};

use crate::db::{RepositoryError, SavedCartStore};

/// Reads and writes saved carts through a [`SavedCartStore`].
#[derive(Clone)]
pub struct SavedCartService {
    store: Arc<dyn SavedCartStore>,
}

impl SavedCartService {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SavedCartStore>) -> Self {
        Self { store }
    }

    /// Get the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SavedCartStore> {
        &self.store
    }

    /// Fetch the cart saved for a customer, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_saved_cart(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<SavedCart>, RepositoryError> {
        self.store.find_by_customer(customer_id).await
    }

    /// Store a customer's selection.
    ///
    /// An existing cart has its products replaced wholesale and keeps its
    /// original checkout token. Otherwise a new cart is created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any store call fails.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, lines = request.products.len()))]
    pub async fn save_cart(
        &self,
        request: ValidSaveCart,
    ) -> Result<(SaveOutcome, SavedCart), RepositoryError> {
        let ValidSaveCart {
            checkout_token,
            products,
            customer_id,
        } = request;

        let existing = self.store.find_by_customer(&customer_id).await?;

        if existing.is_some() {
            let cart = self.store.update_products(&customer_id, &products).await?;
            info!(cart_id = %cart.id, "Saved cart updated");
            Ok((SaveOutcome::Updated, cart))
        } else {
            let cart = self
                .store
                .create(&customer_id, &checkout_token, &products)
                .await?;
            info!(cart_id = %cart.id, "Saved cart created");
            Ok((SaveOutcome::Created, cart))
        }
    }
}
