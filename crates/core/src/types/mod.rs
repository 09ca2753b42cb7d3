//! Core types for Bramble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;
pub mod role;

pub use cart::{CartItem, MAX_UNIT_PRICE, NewCartItem};
pub use id::*;
pub use price::format_amount;
pub use product::{ColorVariant, Product};
pub use quantity::{Quantity, QuantityError};
pub use role::{RoleParseError, UserRole};
