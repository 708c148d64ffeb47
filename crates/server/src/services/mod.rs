//! Business logic services for the cart store.
//!
//! # Services
//!
//! - `saved_cart` - Read and upsert a customer's saved cart

pub mod saved_cart;

pub use saved_cart::SavedCartService;
