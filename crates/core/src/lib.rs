//! Bramble Core - Shared domain types.
//!
//! This crate provides the types used across all Bramble components:
//! - `storefront` - Cart and recently-viewed stores, JSON API
//! - `cli` - Migrations, recommendation scoring, role lookup
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, quantities, prices, cart items, products, roles
//! - [`recommendation`] - Recommendation score formula used by the batch job

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod recommendation;
pub mod types;

pub use recommendation::recommendation_score;
pub use types::*;
