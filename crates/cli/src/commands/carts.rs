//! Saved cart inspection commands.
//!
//! # Usage
//!
//! ```bash
//! saved-cart carts show 123
//! ```

use saved_cart_core::CustomerId;
use saved_cart_server::db::{self, PgSavedCartStore, SavedCartStore};

use super::{CommandError, database_url};

/// Print the cart saved for `customer_id` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the lookup fails, or no cart has
/// been saved for the customer.
pub async fn show(customer_id: &str) -> Result<(), CommandError> {
    let customer_id = CustomerId::parse(customer_id)?;
    let database_url = database_url()?;

    let pool = db::create_pool(&database_url).await?;
    let store = PgSavedCartStore::new(pool);

    let cart = store
        .find_by_customer(&customer_id)
        .await?
        .ok_or_else(|| CommandError::NotFound(customer_id.to_string()))?;

    tracing::info!(
        "Saved cart {} has {} line(s), last updated {}",
        cart.id,
        cart.products.len(),
        cart.updated_at
    );

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&cart)?);
    }

    Ok(())
}
