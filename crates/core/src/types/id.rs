//! Normalized item identity.
//!
//! Catalog identifiers reach the shopping state as JSON numbers (`7`) or as
//! strings (`"7"`), depending on which page built the item. [`ItemId`] keeps
//! only the canonical string form, so both spellings compare equal and an
//! item can never be stored twice under two representations.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// A catalog item identifier in its canonical string form.
///
/// Two identities are equal iff their string forms are equal.
///
/// ```
/// use handset_core::ItemId;
///
/// assert_eq!(ItemId::from(7), ItemId::from("7"));
/// assert_ne!(ItemId::from(7), ItemId::from("07"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identity from an already-textual token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Extract an identity from an untyped JSON value.
    ///
    /// Numbers and non-empty strings carry an identity; every other JSON kind
    /// (null, bool, arrays, objects, `""`) does not.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self::from_number(n)),
            _ => None,
        }
    }

    fn from_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            return Self(i.to_string());
        }
        if let Some(u) = n.as_u64() {
            return Self(u.to_string());
        }
        n.as_f64()
            .map_or_else(|| Self(n.to_string()), Self::from_float)
    }

    // `7.0` and `7` are the same catalog item.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn from_float(f: f64) -> Self {
        if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT {
            Self((f as i64).to_string())
        } else {
            Self(f.to_string())
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty token, which names no catalog item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the identity and returns its canonical string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Returns `true` when both tokens name the same catalog item.
///
/// ```
/// use handset_core::same_identity;
///
/// assert!(same_identity(42, "42"));
/// assert!(!same_identity(42, "43"));
/// ```
pub fn same_identity(a: impl Into<ItemId>, b: impl Into<ItemId>) -> bool {
    a.into() == b.into()
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom("item id must be a number or a non-empty string")
        })
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&String> for ItemId {
    fn from(raw: &String) -> Self {
        Self(raw.clone())
    }
}

impl From<&ItemId> for ItemId {
    fn from(id: &ItemId) -> Self {
        id.clone()
    }
}

impl From<i32> for ItemId {
    fn from(raw: i32) -> Self {
        Self(raw.to_string())
    }
}

impl From<u32> for ItemId {
    fn from(raw: u32) -> Self {
        Self(raw.to_string())
    }
}

impl From<i64> for ItemId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_numeric_and_textual_ids_are_equal() {
        assert_eq!(ItemId::from(7), ItemId::from("7"));
        assert_eq!(ItemId::from(7_u64), ItemId::from(String::from("7")));
        assert!(same_identity(1, "1"));
    }

    #[test]
    fn test_textual_variants_stay_distinct() {
        assert!(!same_identity("07", 7));
        assert!(!same_identity("7 ", "7"));
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(ItemId::from_json(&json!(12)).unwrap().as_str(), "12");
        assert_eq!(ItemId::from_json(&json!(-3)).unwrap().as_str(), "-3");
        assert_eq!(ItemId::from_json(&json!(12.0)).unwrap().as_str(), "12");
        assert_eq!(ItemId::from_json(&json!(1.5)).unwrap().as_str(), "1.5");
    }

    #[test]
    fn test_from_json_rejects_non_identities() {
        assert!(ItemId::from_json(&json!(null)).is_none());
        assert!(ItemId::from_json(&json!(true)).is_none());
        assert!(ItemId::from_json(&json!("")).is_none());
        assert!(ItemId::from_json(&json!([1])).is_none());
        assert!(ItemId::from_json(&json!({"id": 1})).is_none());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: ItemId = serde_json::from_str("7").unwrap();
        let b: ItemId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<ItemId>("null").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = ItemId::from(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ItemId::from("abc")), "abc");
    }
}
