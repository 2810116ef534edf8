//! Persisted aggregate store.
//!
//! A [`PersistedStore`] owns one aggregate's collection as an immutable
//! [`Snapshot`]. Every committed mutation swaps in a whole new snapshot,
//! notifies subscribers synchronously, then writes the snapshot to storage:
//!
//! ```text
//! open:   load -> migrate -> seed
//! commit: snapshot -> notify -> persist
//! ```
//!
//! Mutations take `&mut self` while subscribers only ever see `&Snapshot`, so
//! a subscriber cannot mutate the store it is observing.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use handset_core::ItemId;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::migrate;
use crate::storage::Storage;

/// An immutable view of an aggregate's collection at one point in time.
pub type Snapshot<E> = Arc<[E]>;

/// Schema description of one persisted aggregate.
pub trait Aggregate {
    /// Aggregate name; the storage key is `"<NAME>-storage"`.
    const NAME: &'static str;

    /// Schema version written alongside the data.
    const VERSION: u32;

    /// Keys the item array has been persisted under, in lookup order.
    const COLLECTION_KEYS: &'static [&'static str] = &["items"];

    /// One member of the collection.
    type Entity: Clone + Serialize + fmt::Debug;

    /// The normalized identity of an entity.
    fn id(entity: &Self::Entity) -> &ItemId;

    /// Rebuild an entity from a persisted object of any historical shape.
    fn migrate_entity(id: ItemId, raw: &Map<String, Value>) -> Self::Entity;

    /// Fold a duplicate found while loading into the entity already kept.
    fn absorb(existing: &mut Self::Entity, duplicate: Self::Entity);
}

/// Handle returned by [`PersistedStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<E> = Box<dyn FnMut(&Snapshot<E>)>;

/// An aggregate collection kept in memory and mirrored to storage.
pub struct PersistedStore<A: Aggregate> {
    key: String,
    storage: Arc<dyn Storage>,
    snapshot: Snapshot<A::Entity>,
    subscribers: Vec<(SubscriptionId, Subscriber<A::Entity>)>,
    next_subscription: u64,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> PersistedStore<A> {
    /// Open the aggregate: read its blob, migrate it and seed the collection.
    #[instrument(skip(storage), fields(aggregate = A::NAME))]
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let key = migrate::storage_key(A::NAME);
        let raw = migrate::load(storage.as_ref(), &key);
        let items = migrate::migrate::<A>(raw.as_deref());
        tracing::debug!(items = items.len(), "Loaded persisted state");

        Self {
            key,
            storage,
            snapshot: items.into(),
            subscribers: Vec::new(),
            next_subscription: 0,
            _aggregate: PhantomData,
        }
    }

    /// The storage key this aggregate persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current collection.
    #[must_use]
    pub fn items(&self) -> &[A::Entity] {
        &self.snapshot
    }

    /// A shared handle to the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<A::Entity> {
        Arc::clone(&self.snapshot)
    }

    /// Find the entity with the given identity.
    #[must_use]
    pub fn find(&self, id: &ItemId) -> Option<&A::Entity> {
        self.snapshot.iter().find(|e| A::id(e) == id)
    }

    /// Register an observer, called with every new snapshot.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot<A::Entity>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Derive the next collection from the current one.
    ///
    /// `next` returns `None` when nothing changes; the store then neither
    /// notifies nor persists.
    pub fn update(&mut self, next: impl FnOnce(&[A::Entity]) -> Option<Vec<A::Entity>>) {
        if let Some(items) = next(&self.snapshot) {
            self.commit(items);
        }
    }

    /// Replace the collection unconditionally.
    pub fn replace(&mut self, items: Vec<A::Entity>) {
        self.commit(items);
    }

    fn commit(&mut self, items: Vec<A::Entity>) {
        self.snapshot = items.into();
        tracing::debug!(
            aggregate = A::NAME,
            items = self.snapshot.len(),
            "Committed new snapshot"
        );

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.snapshot);
        }
        self.flush();
    }

    /// Write the current snapshot to storage in the current blob shape.
    pub fn flush(&self) {
        migrate::persist::<A>(self.storage.as_ref(), &self.key, &self.snapshot);
    }
}

impl<A: Aggregate> fmt::Debug for PersistedStore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedStore")
            .field("key", &self.key)
            .field("items", &self.snapshot)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    /// Minimal aggregate: identities with a hit counter.
    struct Tally;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    struct Hit {
        id: ItemId,
        hits: u64,
    }

    impl Aggregate for Tally {
        const NAME: &'static str = "tally";
        const VERSION: u32 = 1;
        type Entity = Hit;

        fn id(entity: &Hit) -> &ItemId {
            &entity.id
        }

        fn migrate_entity(id: ItemId, raw: &Map<String, Value>) -> Hit {
            Hit {
                id,
                hits: raw.get("hits").and_then(Value::as_u64).unwrap_or(1),
            }
        }

        fn absorb(existing: &mut Hit, duplicate: Hit) {
            existing.hits += duplicate.hits;
        }
    }

    fn hit(id: &str, hits: u64) -> Hit {
        Hit {
            id: ItemId::from(id),
            hits,
        }
    }

    #[test]
    fn test_open_empty_storage() {
        let store = PersistedStore::<Tally>::open(Arc::new(MemoryStorage::new()));
        assert!(store.items().is_empty());
        assert_eq!(store.key(), "tally-storage");
    }

    #[test]
    fn test_open_merges_duplicates() {
        let blob = json!({"version": 1, "items": [
            {"id": 1, "hits": 2}, {"id": "2"}, {"id": "1", "hits": 3}
        ]});
        let storage = MemoryStorage::with_entry("tally-storage", serde_json::to_vec(&blob).unwrap());
        let store = PersistedStore::<Tally>::open(Arc::new(storage));
        assert_eq!(store.items(), &[hit("1", 5), hit("2", 1)]);
    }

    #[test]
    fn test_commit_persists_current_shape() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = PersistedStore::<Tally>::open(storage.clone());
        store.replace(vec![hit("a", 1)]);

        let raw: Value = serde_json::from_slice(&storage.get("tally-storage").unwrap()).unwrap();
        assert_eq!(raw, json!({"version": 1, "items": [{"id": "a", "hits": 1}]}));
    }

    #[test]
    fn test_subscribers_see_new_snapshot_before_return() {
        let mut store = PersistedStore::<Tally>::open(Arc::new(MemoryStorage::new()));
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let sink = Rc::clone(&seen);
        store.subscribe(move |snap| sink.borrow_mut().push(snap.len()));

        store.replace(vec![hit("a", 1)]);
        store.replace(vec![hit("a", 1), hit("b", 1)]);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_update_without_change_is_silent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = PersistedStore::<Tally>::open(storage.clone());
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.update(|_| None);
        assert_eq!(*calls.borrow(), 0);
        assert!(storage.get("tally-storage").is_none());
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = PersistedStore::<Tally>::open(Arc::new(MemoryStorage::new()));
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
        assert_eq!(store.subscriber_count(), 1);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.replace(vec![hit("a", 1)]);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_old_snapshots_are_untouched() {
        let mut store = PersistedStore::<Tally>::open(Arc::new(MemoryStorage::new()));
        store.replace(vec![hit("a", 1)]);
        let before = store.snapshot();
        store.replace(vec![hit("b", 1)]);

        assert_eq!(&*before, &[hit("a", 1)]);
        assert_eq!(store.items(), &[hit("b", 1)]);
    }

    #[test]
    fn test_find() {
        let mut store = PersistedStore::<Tally>::open(Arc::new(MemoryStorage::new()));
        store.replace(vec![hit("7", 1)]);
        assert!(store.find(&ItemId::from(7)).is_some());
        assert!(store.find(&ItemId::from(8)).is_none());
    }
}
