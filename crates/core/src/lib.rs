//! Handset Core - Shared types library.
//!
//! This crate provides the types shared between the shopping-state crate
//! (`handset-basket`), the `hs-cli` tool and the integration tests.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Item identities, quantities and the catalog item descriptor

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
