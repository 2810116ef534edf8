//! Shopping-state configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `HANDSET_STORAGE_DIR` - Directory for persisted cart/favorites blobs.
//!   When unset, the shopping state lives in memory only.
//! - `HANDSET_CHECKOUT_PHONE` - Phone number (digits only) receiving checkout
//!   messages (default: 966500000000)
//! - `HANDSET_MESSAGING_BASE_URL` - Messaging deep-link base (default: <https://wa.me/>)
//! - `HANDSET_CURRENCY` - Currency label printed in order summaries (default: SAR)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_CHECKOUT_PHONE: &str = "966500000000";
const DEFAULT_MESSAGING_BASE_URL: &str = "https://wa.me/";
const DEFAULT_CURRENCY: &str = "SAR";

/// E.164 numbers carry at most 15 digits.
const MAX_PHONE_DIGITS: usize = 15;
const MIN_PHONE_DIGITS: usize = 6;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopping-state configuration.
#[derive(Debug, Clone)]
pub struct BasketConfig {
    /// Directory holding persisted blobs; `None` disables persistence
    pub storage_dir: Option<PathBuf>,
    /// Messaging checkout configuration
    pub checkout: CheckoutConfig,
}

/// Where checkout messages are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Recipient phone number, digits only
    pub phone: String,
    /// Deep-link base URL, always ending in `/`
    pub base_url: Url,
    /// Currency label used in order summaries
    pub currency: String,
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            checkout: CheckoutConfig::default(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            phone: DEFAULT_CHECKOUT_PHONE.to_string(),
            base_url: default_base_url(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl BasketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("HANDSET_STORAGE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        let checkout = CheckoutConfig::from_lookup(&lookup)?;

        Ok(Self {
            storage_dir,
            checkout,
        })
    }
}

impl CheckoutConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let phone = lookup("HANDSET_CHECKOUT_PHONE")
            .unwrap_or_else(|| DEFAULT_CHECKOUT_PHONE.to_string());
        validate_phone(&phone, "HANDSET_CHECKOUT_PHONE")?;

        let raw_url = lookup("HANDSET_MESSAGING_BASE_URL")
            .unwrap_or_else(|| DEFAULT_MESSAGING_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_url, "HANDSET_MESSAGING_BASE_URL")?;

        let currency = lookup("HANDSET_CURRENCY")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(Self {
            phone,
            base_url,
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate that a phone number is plain digits of a plausible length.
fn validate_phone(phone: &str, var_name: &str) -> Result<(), ConfigError> {
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must contain digits only (no '+', spaces or dashes)".to_string(),
        ));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&phone.len()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!(
                "must have {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits (got {})",
                phone.len()
            ),
        ));
    }
    Ok(())
}

/// The parsed form of `DEFAULT_MESSAGING_BASE_URL`.
#[allow(clippy::expect_used)] // constant input, covered by test_default_base_url
fn default_base_url() -> Url {
    parse_base_url(DEFAULT_MESSAGING_BASE_URL, "HANDSET_MESSAGING_BASE_URL")
        .expect("DEFAULT_MESSAGING_BASE_URL is a valid base URL")
}

/// Parse a deep-link base URL, forcing a trailing slash so the phone number
/// is appended rather than replacing the last path segment.
fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be a hierarchical URL such as https://wa.me/".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
