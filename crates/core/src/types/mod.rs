//! Core types for the Handset store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod quantity;

pub use catalog::{CatalogItem, CatalogProduct};
pub use id::{ItemId, same_identity};
pub use quantity::{Quantity, QuantityError};
