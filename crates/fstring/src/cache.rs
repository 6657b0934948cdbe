//! Concurrent memo tables.
//!
//! Both engine caches are insert-only maps shared between threads. Keys are
//! spread over a fixed number of shards, each behind its own `RwLock`, so
//! unrelated keys never contend on one lock. Entries are never evicted.
//!
//! Lookups take a shard read lock. Inserts take the write lock and keep the
//! first value stored under a key; a thread that lost the race keeps using
//! the value it computed itself. Computing the same key twice is allowed.

use std::any::{Any, TypeId};
use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::hash::{BuildHasher, Hash};

use parking_lot::RwLock;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::trace;

use crate::introspect::{AccessKind, Accessor, Introspectable};

const SHARD_COUNT: usize = 16;

/// An insert-only map sharded over `RwLock`s.
pub(crate) struct ShardedMap<K, V> {
    shards: Box<[RwLock<FxHashMap<K, V>>]>,
}

impl<K: Hash + Eq, V: Clone> ShardedMap<K, V> {
    pub fn new() -> Self {
        ShardedMap {
            shards: (0..SHARD_COUNT)
                .map(|_| RwLock::new(FxHashMap::default()))
                .collect(),
        }
    }

    fn shard<Q: Hash + ?Sized>(&self, key: &Q) -> &RwLock<FxHashMap<K, V>> {
        let hash = FxBuildHasher.hash_one(key);
        &self.shards[(hash as usize) % self.shards.len()]
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).read().get(key).cloned()
    }

    /// Stores `value` unless the key is already present. Returns `true` if
    /// this call inserted.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut shard = self.shard(&key).write();
        match shard.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }
}

/// Resolved accessors keyed by receiver type and segment token.
///
/// Tokens are `name` for fields, `name()` for calls and `getName()` for the
/// getter fallback, so the three lookups of one segment never collide.
/// Failed resolutions are not stored.
pub(crate) struct AccessorCache {
    entries: ShardedMap<(TypeId, Box<str>), Accessor>,
}

impl AccessorCache {
    pub fn new() -> Self {
        AccessorCache {
            entries: ShardedMap::new(),
        }
    }

    /// Returns the cached accessor for `token` on the receiver's type, asking
    /// the receiver to resolve `name` on a miss.
    pub fn lookup(
        &self,
        receiver: &dyn Introspectable,
        token: &str,
        name: &str,
        kind: AccessKind,
    ) -> Option<Accessor> {
        let key = (Any::type_id(receiver), Box::<str>::from(token));
        if let Some(accessor) = self.entries.get(&key) {
            trace!(receiver = receiver.type_name(), token, "accessor cache hit");
            return Some(accessor);
        }

        let accessor = receiver.resolve_accessor(name, kind)?;
        trace!(
            receiver = receiver.type_name(),
            token,
            slot = accessor.slot(),
            "accessor resolved"
        );
        self.entries.insert_if_absent(key, accessor.clone());
        Some(accessor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
