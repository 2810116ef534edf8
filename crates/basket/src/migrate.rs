//! Load, migrate and persist aggregate blobs.
//!
//! Persisted layout, one key per aggregate:
//!
//! ```json
//! { "version": 4, "items": [ ... ] }
//! ```
//!
//! Loading is a pipeline of plain functions, each total:
//!
//! 1. [`load`] reads the raw bytes from storage
//! 2. [`decode_envelope`] finds the item array in any historical blob shape
//! 3. [`migrate_items`] rebuilds every item in the current entity shape and
//!    collapses duplicate identities
//!
//! Saving is the reverse: [`encode`] then [`persist`].

use std::collections::HashMap;

use handset_core::ItemId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::item::fields;
use crate::storage::Storage;
use crate::store::Aggregate;

/// The collection part of a persisted blob, before item migration.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Schema version recorded in the blob; `None` for unversioned data.
    pub version: Option<u64>,
    /// Raw items in whatever shape they were written.
    pub items: Vec<Value>,
}

/// The current on-disk shape.
#[derive(Debug, Serialize)]
struct Blob<'a, E> {
    version: u32,
    items: &'a [E],
}

/// Storage key for an aggregate: `"<name>-storage"`.
#[must_use]
pub fn storage_key(name: &str) -> String {
    format!("{name}-storage")
}

/// Read an aggregate's raw blob.
#[must_use]
pub fn load(storage: &dyn Storage, key: &str) -> Option<Vec<u8>> {
    storage.get(key)
}

/// Locate the item array inside a persisted blob.
///
/// Accepted shapes, detected structurally:
///
/// - `{ "version": n, "<collection>": [...] }` (current shape)
/// - `{ "version": n, "state": { "<collection>": [...] } }` (middleware era)
/// - `[...]` (unversioned bare array)
///
/// `collection_keys` lists the names the item array has been stored under.
/// Returns `None` for unparseable or unrecognized blobs.
#[must_use]
pub fn decode_envelope(bytes: &[u8], collection_keys: &[&str]) -> Option<Envelope> {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unparseable persisted blob");
            return None;
        }
    };

    match value {
        Value::Array(items) => Some(Envelope {
            version: None,
            items,
        }),
        Value::Object(mut root) => {
            let version = root.get("version").and_then(Value::as_u64);
            let items = take_collection(&mut root, collection_keys).or_else(|| {
                root.get_mut("state")
                    .and_then(Value::as_object_mut)
                    .and_then(|state| take_collection(state, collection_keys))
            });
            if items.is_none() {
                tracing::warn!("Persisted blob has no recognizable item collection");
            }
            items.map(|items| Envelope { version, items })
        }
        _ => {
            tracing::warn!("Persisted blob is neither an object nor an array");
            None
        }
    }
}

fn take_collection(object: &mut Map<String, Value>, keys: &[&str]) -> Option<Vec<Value>> {
    keys.iter().find_map(|key| match object.remove(*key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    })
}

/// Rebuild raw items as current entities.
///
/// Non-object items and items without a usable identity are dropped.
/// Items sharing an identity are merged with [`Aggregate::absorb`], keeping
/// the position of the first occurrence.
#[must_use]
pub fn migrate_items<A: Aggregate>(envelope: Envelope) -> Vec<A::Entity> {
    if envelope.version != Some(u64::from(A::VERSION)) {
        tracing::debug!(
            aggregate = A::NAME,
            from = ?envelope.version,
            to = A::VERSION,
            "Migrating persisted blob"
        );
    }

    let mut entities: Vec<A::Entity> = Vec::with_capacity(envelope.items.len());
    let mut positions: HashMap<ItemId, usize> = HashMap::new();

    for raw in envelope.items {
        let Value::Object(raw) = raw else {
            tracing::warn!(aggregate = A::NAME, "Dropping persisted item that is not an object");
            continue;
        };
        let Some(id) = fields::ID.identity(&raw) else {
            tracing::warn!(aggregate = A::NAME, "Dropping persisted item without an id");
            continue;
        };

        let entity = A::migrate_entity(id.clone(), &raw);
        match positions.get(&id).and_then(|&pos| entities.get_mut(pos)) {
            Some(existing) => A::absorb(existing, entity),
            None => {
                positions.insert(id, entities.len());
                entities.push(entity);
            }
        }
    }

    entities
}

/// Turn a raw blob (or its absence) into current entities. Never fails:
/// anything unusable yields an empty collection.
#[must_use]
pub fn migrate<A: Aggregate>(raw: Option<&[u8]>) -> Vec<A::Entity> {
    raw.and_then(|bytes| decode_envelope(bytes, A::COLLECTION_KEYS))
        .map(migrate_items::<A>)
        .unwrap_or_default()
}

/// Serialize entities in the current blob shape.
#[must_use]
pub fn encode<A: Aggregate>(items: &[A::Entity]) -> Option<Vec<u8>> {
    let blob = Blob {
        version: A::VERSION,
        items,
    };
    serde_json::to_vec(&blob)
        .inspect_err(|e| tracing::warn!(aggregate = A::NAME, error = %e, "Failed to encode state"))
        .ok()
}

/// Encode and write entities to storage. Fire-and-forget.
pub fn persist<A: Aggregate>(storage: &dyn Storage, key: &str, items: &[A::Entity]) {
    if let Some(bytes) = encode::<A>(items) {
        storage.set(key, &bytes);
    }
}
