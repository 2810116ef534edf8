//! Derived values over aggregate collections.
//!
//! Plain functions recomputed on every call; nothing is cached, so a
//! selector can never disagree with the collection it reads.

use handset_core::ItemId;
use rust_decimal::Decimal;

use crate::cart::CartLine;
use crate::favorites::FavoriteEntry;

/// Price of one line: `price × quantity`, saturating at the `Decimal` range.
#[must_use]
pub fn line_total(line: &CartLine) -> Decimal {
    line.details.price.saturating_mul(Decimal::from(line.quantity.get()))
}

/// Sum of line totals, saturating at the `Decimal` range.
#[must_use]
pub fn total_price(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum of quantities.
#[must_use]
pub fn total_count(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity.get())).sum()
}

/// Quantity held for `id`, or 0.
#[must_use]
pub fn quantity_of(lines: &[CartLine], id: &ItemId) -> u32 {
    lines
        .iter()
        .find(|line| &line.id == id)
        .map_or(0, |line| line.quantity.get())
}

/// Whether `id` is among the favorites.
#[must_use]
pub fn is_favorite(entries: &[FavoriteEntry], id: &ItemId) -> bool {
    entries.iter().any(|entry| &entry.id == id)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use handset_core::{CatalogItem, Quantity};

    use super::*;

    fn line(id: i64, price: Decimal, qty: i64) -> CartLine {
        CartLine::new(
            &CatalogItem::new(id, "Item", price),
            Quantity::clamped(qty),
        )
    }

    #[test]
    fn test_totals() {
        let lines = [line(1, Decimal::from(10), 2), line(2, Decimal::from(5), 1)];
        assert_eq!(total_price(&lines), Decimal::from(25));
        assert_eq!(total_count(&lines), 3);
    }

    #[test]
    fn test_empty_totals() {
        assert_eq!(total_price(&[]), Decimal::ZERO);
        assert_eq!(total_count(&[]), 0);
    }

    #[test]
    fn test_decimal_prices_do_not_drift() {
        let lines = [line(1, Decimal::new(1, 1), 3), line(2, Decimal::new(2, 1), 1)];
        assert_eq!(total_price(&lines), Decimal::new(5, 1));
    }

    #[test]
    fn test_count_does_not_overflow_u32() {
        let lines = [
            line(1, Decimal::ONE, i64::from(u32::MAX)),
            line(2, Decimal::ONE, i64::from(u32::MAX)),
        ];
        assert_eq!(total_count(&lines), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let lines = [line(1, Decimal::MAX, 2), line(2, Decimal::MAX, 1)];
        assert_eq!(line_total(&lines[0]), Decimal::MAX);
        assert_eq!(total_price(&lines), Decimal::MAX);

        let lines = [line(1, Decimal::MIN, 3)];
        assert_eq!(total_price(&lines), Decimal::MIN);
    }

    #[test]
    fn test_quantity_of() {
        let lines = [line(1, Decimal::ONE, 4)];
        assert_eq!(quantity_of(&lines, &ItemId::from("1")), 4);
        assert_eq!(quantity_of(&lines, &ItemId::from("2")), 0);
    }
}
