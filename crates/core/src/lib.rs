//! Saved Cart Core - Shared types library.
//!
//! This crate provides the types shared by every Saved Cart component:
//! - `server` - The cart store service (`/api/getCart`, `/api/saveCart`)
//! - `widget` - The checkout extension state machine and its HTTP client
//! - `cli` - Command-line tools for migrations and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. The JSON shapes here are the wire contract between the
//! widget and the service, so both sides serialize through the same structs.
//!
//! # Modules
//!
//! - [`types`] - Customer IDs, cart lines, saved carts and API payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
