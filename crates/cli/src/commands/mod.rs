//! Command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use handset_basket::{BasketConfig, ConfigError, FileStorage, Storage, StorageError};
use thiserror::Error;

pub mod cart;
pub mod favorites;
pub mod storage;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// No storage directory was given.
    #[error("No storage directory: pass --storage-dir or set HANDSET_STORAGE_DIR")]
    MissingStorageDir,

    /// Invalid environment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The storage directory could not be used.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The id is not in the cart.
    #[error("Not in cart: {0}")]
    NotInCart(String),

    /// The id is not a favorite.
    #[error("Not a favorite: {0}")]
    NotAFavorite(String),
}

/// Configuration and storage shared by every command.
pub struct Context {
    pub config: BasketConfig,
    pub files: FileStorage,
}

impl Context {
    /// Load configuration and open the storage directory.
    ///
    /// `storage_dir` overrides `HANDSET_STORAGE_DIR`.
    pub fn load(storage_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let config = BasketConfig::from_env()?;
        let dir = storage_dir
            .or_else(|| config.storage_dir.clone())
            .ok_or(CliError::MissingStorageDir)?;

        let files = FileStorage::open(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened storage directory");
        Ok(Self { config, files })
    }

    /// The storage handle aggregates are opened on.
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::new(self.files.clone())
    }
}
