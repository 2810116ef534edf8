//! Handset Basket - client-resident shopping state.
//!
//! This crate owns the shopper's cart and favorites. Both live in memory as
//! immutable snapshots, are mirrored to a key/value [`Storage`] after every
//! change, and are migrated from any historical blob shape on startup.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use handset_basket::{Cart, MemoryStorage};
//! use handset_core::CatalogItem;
//! use rust_decimal::Decimal;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut cart = Cart::open(storage.clone());
//! cart.add_to_cart(&CatalogItem::new(1, "Galaxy S24", Decimal::from(3999)), 2);
//! assert_eq!(cart.total_count(), 2);
//!
//! // A fresh cart on the same storage sees the same lines.
//! assert_eq!(Cart::open(storage).lines(), cart.lines());
//! ```
//!
//! # Modules
//!
//! - [`storage`] - Key/value media: no-op, in-memory and file-backed
//! - [`migrate`] - Blob decoding and schema migration
//! - [`store`] - Generic persisted aggregate with subscriptions
//! - [`cart`] / [`favorites`] - The two aggregates
//! - [`selectors`] - Totals and lookups derived from snapshots
//! - [`checkout`] - Messaging checkout text and links
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod item;
pub mod migrate;
pub mod selectors;
pub mod storage;
pub mod store;

pub use cart::{Cart, CartLine};
pub use config::{BasketConfig, CheckoutConfig, ConfigError};
pub use error::StorageError;
pub use favorites::{FavoriteEntry, Favorites};
pub use item::ItemDetails;
pub use storage::{FileStorage, MemoryStorage, NoopStorage, Storage};
pub use store::{Aggregate, PersistedStore, Snapshot, SubscriptionId};
