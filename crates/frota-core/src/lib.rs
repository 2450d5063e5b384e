//! Core types and trait definitions for the Frota identity service.
//!
//! This crate is deliberately free of HTTP, database and crypto dependencies.
//! Every other crate depends on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod principal;
pub mod relationship;
pub mod store;

pub use error::{Domain, Error, Result};
