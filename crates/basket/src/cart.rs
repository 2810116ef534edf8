//! Cart aggregate.
//!
//! Invariants:
//!
//! - at most one line per [`ItemId`]
//! - every line has a quantity of at least 1; a line that would reach zero
//!   is removed instead
//!
//! All operations are total: unknown ids are ignored and out-of-range
//! quantities are clamped.

use std::sync::Arc;

use handset_core::{CatalogItem, ItemId, Quantity};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::favorites::FavoriteEntry;
use crate::item::{ItemDetails, fields, non_empty};
use crate::selectors;
use crate::storage::Storage;
use crate::store::{Aggregate, PersistedStore, Snapshot, SubscriptionId};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: ItemId,
    #[serde(flatten)]
    pub details: ItemDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a line for a catalog item, applying display placeholders.
    #[must_use]
    pub fn new(item: &CatalogItem, quantity: Quantity) -> Self {
        Self {
            id: item.id.clone(),
            details: ItemDetails::from_catalog(item),
            note: non_empty(item.note.as_deref()),
            quantity,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        selectors::line_total(self)
    }
}

/// Schema of the persisted cart.
#[derive(Debug)]
pub struct CartSchema;

impl Aggregate for CartSchema {
    const NAME: &'static str = "cart";
    const VERSION: u32 = 4;
    type Entity = CartLine;

    fn id(line: &CartLine) -> &ItemId {
        &line.id
    }

    fn migrate_entity(id: ItemId, raw: &Map<String, Value>) -> CartLine {
        CartLine {
            id,
            details: ItemDetails::from_persisted(raw),
            note: fields::NOTE.text(raw),
            quantity: Quantity::from_json(fields::QUANTITY.value(raw)),
        }
    }

    fn absorb(existing: &mut CartLine, duplicate: CartLine) {
        existing.quantity = existing.quantity.saturating_add(duplicate.quantity);
    }
}

/// The shopping cart.
#[derive(Debug)]
pub struct Cart {
    store: PersistedStore<CartSchema>,
}

impl Cart {
    /// Open the cart persisted in `storage`.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: PersistedStore::open(storage),
        }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.store.items()
    }

    /// A shared handle to the current lines.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<CartLine> {
        self.store.snapshot()
    }

    /// Observe every new set of lines.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot<CartLine>) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    /// Stop observing. Returns `false` if the subscription was not active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: impl Into<ItemId>) -> Option<&CartLine> {
        self.store.find(&id.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Add `qty` units of `item` (clamped to at least 1).
    ///
    /// An existing line keeps its display fields and only gains quantity.
    /// Items with an empty id are ignored: they could not be reloaded.
    pub fn add_to_cart(&mut self, item: &CatalogItem, qty: i64) {
        if item.id.is_empty() {
            tracing::warn!("Ignoring cart item with an empty id");
            return;
        }
        let add = Quantity::clamped(qty);
        self.store.update(|lines| {
            let mut next = lines.to_vec();
            match next.iter_mut().find(|line| line.id == item.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(add),
                None => next.push(CartLine::new(item, add)),
            }
            Some(next)
        });
    }

    /// Add one unit of `item`.
    pub fn add(&mut self, item: &CatalogItem) {
        self.add_to_cart(item, 1);
    }

    /// Add a favorite to the cart.
    pub fn add_favorite_to_cart(&mut self, favorite: &FavoriteEntry, qty: i64) {
        self.add_to_cart(&favorite.to_catalog(), qty);
    }

    /// Remove the line for `id`; no-op if absent.
    pub fn remove_from_cart(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        self.store.update(|lines| without(lines, &id));
    }

    /// Set the quantity of an existing line. A quantity of zero or less
    /// removes the line.
    pub fn set_quantity(&mut self, id: impl Into<ItemId>, qty: i64) {
        let id = id.into();
        let Some(quantity) = Quantity::from_requested(qty) else {
            self.store.update(|lines| without(lines, &id));
            return;
        };
        self.store
            .update(|lines| with_quantity(lines, &id, |_| Some(quantity)));
    }

    /// Raise a line's quantity by one; no-op if absent.
    pub fn increment(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        self.store
            .update(|lines| with_quantity(lines, &id, |q| Some(q.incremented())));
    }

    /// Lower a line's quantity by one, removing it when it was 1; no-op if
    /// absent.
    pub fn decrement(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        self.store
            .update(|lines| with_quantity(lines, &id, Quantity::decremented));
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.store.replace(Vec::new());
    }

    /// Alias of [`Cart::clear_cart`].
    pub fn clear(&mut self) {
        self.clear_cart();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        selectors::total_price(self.lines())
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        selectors::total_count(self.lines())
    }

    /// Quantity held for `id`, 0 when not in the cart.
    #[must_use]
    pub fn quantity_of(&self, id: impl Into<ItemId>) -> u32 {
        selectors::quantity_of(self.lines(), &id.into())
    }

    /// Rewrite the persisted blob in the current shape.
    pub fn flush(&self) {
        self.store.flush();
    }
}

fn without(lines: &[CartLine], id: &ItemId) -> Option<Vec<CartLine>> {
    if !lines.iter().any(|line| &line.id == id) {
        return None;
    }
    Some(lines.iter().filter(|line| &line.id != id).cloned().collect())
}

/// Apply `change` to the quantity of the line for `id`; `None` from
/// `change` drops the line.
fn with_quantity(
    lines: &[CartLine],
    id: &ItemId,
    change: impl Fn(Quantity) -> Option<Quantity>,
) -> Option<Vec<CartLine>> {
    let pos = lines.iter().position(|line| &line.id == id)?;
    let mut next = lines.to_vec();
    match next.get(pos).and_then(|line| change(line.quantity)) {
        Some(quantity) => {
            if let Some(line) = next.get_mut(pos) {
                line.quantity = quantity;
            }
        }
        None => {
            next.remove(pos);
        }
    }
    Some(next)
}
