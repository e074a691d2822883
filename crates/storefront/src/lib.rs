//! Dokan storefront library.
//!
//! The cart consistency component ([`cart`]), the hosted backend client it
//! runs against ([`backend`]), and the HTTP surface around them. The
//! `dokan-storefront` binary and the integration tests both build on this
//! crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod backend;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use app::build_router;
