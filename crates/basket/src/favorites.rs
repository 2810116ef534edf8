//! Favorites aggregate: a set of items keyed by [`ItemId`].

use std::sync::Arc;

use handset_core::{CatalogItem, ItemId};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::item::{ItemDetails, fields};
use crate::selectors;
use crate::storage::Storage;
use crate::store::{Aggregate, PersistedStore, Snapshot, SubscriptionId};

/// One favorited product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteEntry {
    pub id: ItemId,
    #[serde(flatten)]
    pub details: ItemDetails,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FavoriteEntry {
    /// Create an entry for a catalog item, applying display placeholders.
    #[must_use]
    pub fn new(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            details: ItemDetails::from_catalog(item),
            tags: item.tags.clone(),
        }
    }

    /// The catalog descriptor this entry was built from, for adding it to
    /// the cart.
    #[must_use]
    pub fn to_catalog(&self) -> CatalogItem {
        CatalogItem {
            tags: self.tags.clone(),
            ..self.details.to_catalog(&self.id)
        }
    }
}

/// Schema of the persisted favorites.
#[derive(Debug)]
pub struct FavoritesSchema;

impl Aggregate for FavoritesSchema {
    const NAME: &'static str = "favorites";
    const VERSION: u32 = 2;
    /// Older blobs stored the entries under `favorites`.
    const COLLECTION_KEYS: &'static [&'static str] = &["items", "favorites"];
    type Entity = FavoriteEntry;

    fn id(entry: &FavoriteEntry) -> &ItemId {
        &entry.id
    }

    fn migrate_entity(id: ItemId, raw: &Map<String, Value>) -> FavoriteEntry {
        FavoriteEntry {
            id,
            details: ItemDetails::from_persisted(raw),
            tags: fields::TAGS.string_list(raw).unwrap_or_default(),
        }
    }

    // Set semantics: the first occurrence wins.
    fn absorb(_existing: &mut FavoriteEntry, _duplicate: FavoriteEntry) {}
}

/// The user's favorites.
#[derive(Debug)]
pub struct Favorites {
    store: PersistedStore<FavoritesSchema>,
}

impl Favorites {
    /// Open the favorites persisted in `storage`.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: PersistedStore::open(storage),
        }
    }

    /// Current entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[FavoriteEntry] {
        self.store.items()
    }

    /// A shared handle to the current entries.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<FavoriteEntry> {
        self.store.snapshot()
    }

    /// Observe every new set of entries.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&Snapshot<FavoriteEntry>) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    /// Stop observing. Returns `false` if the subscription was not active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// The entry for `id`, if present.
    #[must_use]
    pub fn entry(&self, id: impl Into<ItemId>) -> Option<&FavoriteEntry> {
        self.store.find(&id.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Remove `item` if it is a favorite, add it otherwise.
    ///
    /// Toggling the same item twice restores the previous membership.
    /// Returns whether the item is a favorite afterwards. Items with an
    /// empty id are ignored.
    pub fn toggle_favorite(&mut self, item: &CatalogItem) -> bool {
        if item.id.is_empty() {
            tracing::warn!("Ignoring favorite with an empty id");
            return false;
        }
        let mut added = false;
        self.store.update(|entries| {
            let next = if selectors::is_favorite(entries, &item.id) {
                entries.iter().filter(|e| e.id != item.id).cloned().collect()
            } else {
                added = true;
                let mut next = entries.to_vec();
                next.push(FavoriteEntry::new(item));
                next
            };
            Some(next)
        });
        added
    }

    /// Remove the entry for `id`; no-op if absent.
    pub fn remove_favorite(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        self.store.update(|entries| {
            selectors::is_favorite(entries, &id)
                .then(|| entries.iter().filter(|e| e.id != id).cloned().collect())
        });
    }

    /// Whether `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: impl Into<ItemId>) -> bool {
        selectors::is_favorite(self.entries(), &id.into())
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.store.replace(Vec::new());
    }

    /// Rewrite the persisted blob in the current shape.
    pub fn flush(&self) {
        self.store.flush();
    }
}
