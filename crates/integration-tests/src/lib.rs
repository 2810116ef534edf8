//! Integration tests for Handset shopping state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p handset-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart mutations end to end
//! - `favorites` - Favorites and favorite-to-cart flows
//! - `persistence` - File-backed reloads and legacy blob migration
//! - `checkout` - Messaging checkout links built from a live cart
//!
//! Every test gets its own storage directory through [`TestContext`].

use std::path::Path;
use std::sync::Arc;

use handset_basket::{Cart, Favorites, FileStorage, Storage};
use handset_core::CatalogItem;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A throwaway storage directory and the stores opened on it.
pub struct TestContext {
    dir: TempDir,
    storage: Arc<FileStorage>,
}

impl TestContext {
    /// Create an empty storage directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = FileStorage::open(dir.path()).expect("open file storage");
        Self {
            dir,
            storage: Arc::new(storage),
        }
    }

    /// Create a storage directory holding one raw blob.
    #[must_use]
    pub fn with_blob(key: &str, blob: &serde_json::Value) -> Self {
        let ctx = Self::new();
        ctx.write_raw(key, blob.to_string().as_bytes());
        ctx
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    /// Open the cart as a freshly started client would.
    #[must_use]
    pub fn cart(&self) -> Cart {
        Cart::open(self.storage())
    }

    /// Open the favorites as a freshly started client would.
    #[must_use]
    pub fn favorites(&self) -> Favorites {
        Favorites::open(self.storage())
    }

    pub fn write_raw(&self, key: &str, bytes: &[u8]) {
        self.storage.set(key, bytes);
    }

    /// The persisted blob under `key`, parsed.
    #[must_use]
    pub fn read_json(&self, key: &str) -> Option<serde_json::Value> {
        self.storage
            .get(key)
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully described phone.
#[must_use]
pub fn phone(id: i64, name: &str, price: i64) -> CatalogItem {
    CatalogItem::new(id, name, Decimal::from(price))
        .with_image(format!("/images/phones/{id}.jpg"))
        .with_brand(1, "Samsung")
        .with_category(2, "Smartphones")
}
