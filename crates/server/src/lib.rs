//! Saved Cart server library.
//!
//! The cart store service behind the checkout extension: one saved cart per
//! customer, read with `GET /api/getCart` and upserted with
//! `POST /api/saveCart`. Exposed as a library so the router can be tested
//! in-process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
