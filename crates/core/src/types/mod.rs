//! Core types for Saved Cart.
//!
//! This module provides type-safe wrappers for the saved cart domain.

pub mod api;
pub mod cart_line;
pub mod customer;
pub mod id;
pub mod saved_cart;

pub use api::{
    GetCartQuery, GetCartResponse, INVALID_REQUEST_MESSAGE, MessageBody, SaveCartFailureBody,
    SaveCartRequest, SaveCartRequestError, SaveCartResponse, SaveOutcome, ValidSaveCart,
};
pub use cart_line::{CartLine, Merchandise};
pub use customer::{CustomerId, CustomerIdError};
pub use id::*;
pub use saved_cart::SavedCart;
