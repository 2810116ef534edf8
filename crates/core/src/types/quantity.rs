//! Cart line quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when converting a raw count into a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The count is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The count does not fit in a `u32`.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
        /// The rejected count.
        got: i64,
    },
}

/// A cart line quantity, always at least 1.
///
/// A line whose quantity would drop to zero is removed instead, so zero is
/// not representable.
///
/// ## Examples
///
/// ```
/// use handset_core::Quantity;
///
/// assert_eq!(Quantity::clamped(-4).get(), 1);
/// assert_eq!(Quantity::clamped(3).get(), 3);
/// assert!(Quantity::from_requested(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Clamp a requested count into `[1, u32::MAX]`.
    #[must_use]
    pub fn clamped(count: i64) -> Self {
        Self::from_requested(count).unwrap_or(Self::ONE)
    }

    /// Convert a requested count, returning `None` when it is zero or negative.
    ///
    /// Counts above `u32::MAX` saturate.
    #[must_use]
    pub fn from_requested(count: i64) -> Option<Self> {
        if count <= 0 {
            return None;
        }
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        NonZeroU32::new(count).map(Self)
    }

    /// Coerce an untyped JSON quantity from persisted data.
    ///
    /// Finite numbers and numeric strings are rounded to the nearest integer
    /// and clamped to at least 1. Anything else (missing, `NaN`, text, null)
    /// becomes 1.
    #[must_use]
    pub fn from_json(value: Option<&Value>) -> Self {
        let raw = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        raw.filter(|f| f.is_finite())
            .map_or(Self::ONE, Self::from_float)
    }

    // Saturating `as` cast: values beyond `i64` clamp before conversion.
    #[allow(clippy::cast_possible_truncation)]
    fn from_float(f: f64) -> Self {
        Self::clamped(f.round() as i64)
    }

    /// Returns the quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add `other` to this quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }

    /// The next quantity up, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The next quantity down, or `None` when this is already 1.
    #[must_use]
    pub fn decremented(self) -> Option<Self> {
        NonZeroU32::new(self.0.get() - 1).map(Self)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        if count <= 0 {
            return Err(QuantityError::NotPositive(count));
        }
        let value = u32::try_from(count).map_err(|_| QuantityError::TooLarge {
            max: u32::MAX,
            got: count,
        })?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive(count))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(Quantity::clamped(0).get(), 1);
        assert_eq!(Quantity::clamped(-10).get(), 1);
        assert_eq!(Quantity::clamped(5).get(), 5);
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_from_requested() {
        assert!(Quantity::from_requested(0).is_none());
        assert!(Quantity::from_requested(-1).is_none());
        assert_eq!(Quantity::from_requested(2).unwrap().get(), 2);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Quantity::from_json(Some(&json!(3))).get(), 3);
        assert_eq!(Quantity::from_json(Some(&json!(2.6))).get(), 3);
        assert_eq!(Quantity::from_json(Some(&json!("4"))).get(), 4);
        assert_eq!(Quantity::from_json(Some(&json!(0))).get(), 1);
        assert_eq!(Quantity::from_json(Some(&json!(-7))).get(), 1);
        assert_eq!(Quantity::from_json(Some(&json!("lots"))).get(), 1);
        assert_eq!(Quantity::from_json(Some(&json!(null))).get(), 1);
        assert_eq!(Quantity::from_json(None).get(), 1);
    }

    #[test]
    fn test_from_json_huge_values_saturate() {
        assert_eq!(Quantity::from_json(Some(&json!(1e300))).get(), u32::MAX);
    }

    #[test]
    fn test_decremented() {
        assert!(Quantity::ONE.decremented().is_none());
        assert_eq!(Quantity::clamped(2).decremented().unwrap().get(), 1);
    }

    #[test]
    fn test_saturating_ops() {
        let max = Quantity::clamped(i64::from(u32::MAX));
        assert_eq!(max.incremented().get(), u32::MAX);
        assert_eq!(max.saturating_add(Quantity::ONE).get(), u32::MAX);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(Quantity::try_from(0), Err(QuantityError::NotPositive(0)));
        assert!(matches!(
            Quantity::try_from(i64::from(u32::MAX) + 1),
            Err(QuantityError::TooLarge { .. })
        ));
        assert_eq!(Quantity::try_from(9).unwrap().get(), 9);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Quantity::clamped(3)).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
