/*
 * Copyright 2021 Luca Fulchir <luker@fenrirproject.org>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::results::{Error, InsertResult};
use crate::slab::{Slab, SlabIdx};
use crate::user;
use ::std::borrow::Borrow;
use ::std::hash::{BuildHasher, Hash};

/// Upper bound on what the constructor allocates, whatever the capacity
pub const MAX_PREALLOC: usize = 4096;

struct Entry<K, V> {
    key: K,
    val: V,
}

/// Simple LRU implementation, single thread only.
/// Wrap it in [`crate::sync::Cache`] to share it.
///
/// The hashmap only stores the slot index of each key, the recency
/// ordering lives in a [`Slab`], so no entry is ever moved or reallocated
/// on promotion.
pub struct LRU<
    K,
    V,
    L = user::ZeroListener,
    HB = ::hashbrown::hash_map::DefaultHashBuilder,
> {
    _capacity: usize,
    _hmap: ::hashbrown::HashMap<K, SlabIdx, HB>,
    _slab: Slab<Entry<K, V>>,
    _listener: L,
}

impl<K: Hash + Clone + Eq, V> LRU<K, V> {
    pub fn new(entries: usize) -> Result<LRU<K, V>, Error> {
        LRU::with_listener_and_hasher(
            entries,
            0,
            user::ZeroListener {},
            ::hashbrown::hash_map::DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, L, HB> LRU<K, V, L, HB>
where
    K: Hash + Clone + Eq,
    L: user::Listener<K, V>,
    HB: BuildHasher,
{
    /// `entries` is the maximum number of keys we will ever hold, and must be
    /// at least 1.
    /// `extra_hashmap_capacity` is just headroom for the hashmap so that it
    /// is never completely full.
    ///
    /// At most [`MAX_PREALLOC`] entries are allocated up front, the rest is
    /// allocated as the LRU fills up
    pub fn with_listener_and_hasher(
        entries: usize,
        extra_hashmap_capacity: usize,
        listener: L,
        hash_builder: HB,
    ) -> Result<LRU<K, V, L, HB>, Error> {
        if entries < 1 {
            return Err(Error::InvalidCapacity { capacity: entries });
        }
        let hashmap_capacity = entries
            .checked_add(extra_hashmap_capacity)
            .ok_or(Error::InvalidCapacity { capacity: entries })?;
        Ok(LRU {
            _capacity: entries,
            _hmap: ::hashbrown::HashMap::with_capacity_and_hasher(
                hashmap_capacity.min(MAX_PREALLOC),
                hash_builder,
            ),
            _slab: Slab::with_capacity(entries.min(MAX_PREALLOC)),
            _listener: listener,
        })
    }
    /// Insert or update a key, which always becomes the most recently used.
    ///
    /// A new key on a full LRU evicts the tail first, so the number of
    /// entries never goes above the capacity
    pub fn insert(&mut self, key: K, val: V) -> InsertResult<K, V> {
        if let Some(idx) = self._hmap.get(&key).copied() {
            debug_assert!(
                self._slab.get(idx).is_some(),
                "hashmap points to a free slab slot"
            );
            if let Some(entry) = self._slab.get_mut(idx) {
                let old_val = ::std::mem::replace(&mut entry.val, val);
                self._slab.make_head(idx);
                return InsertResult::OldEntry(old_val);
            }
        }

        let old_tail = if self._hmap.len() >= self._capacity {
            self._slab.pop_tail()
        } else {
            None
        };
        if let Some(ref evicted) = old_tail {
            self._hmap.remove(&evicted.key);
        }
        let idx = self._slab.push_head(Entry {
            key: key.clone(),
            val: val,
        });
        self._hmap.insert(key, idx);

        // the LRU is consistent again before any user code runs
        match old_tail {
            None => InsertResult::Success,
            Some(evicted) => {
                ::tracing::debug!(
                    len = self._hmap.len(),
                    capacity = self._capacity,
                    "evicted least recently used entry"
                );
                self._listener.on_evict(&evicted.key, &evicted.val);
                InsertResult::OldTail(evicted.key, evicted.val)
            }
        }
    }
    /// Get the value and promote the key to most recently used.
    /// A miss does not touch the ordering
    pub fn get<Q: ?Sized>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let idx = *self._hmap.get(key)?;
        self._slab.make_head(idx);
        self._slab.get(idx).map(|e| &e.val)
    }
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let idx = *self._hmap.get(key)?;
        self._slab.make_head(idx);
        self._slab.get_mut(idx).map(|e| &mut e.val)
    }
    /// Like `get`, but without changing the recency of the key
    pub fn peek<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let idx = *self._hmap.get(key)?;
        self._slab.get(idx).map(|e| &e.val)
    }
    /// The entry that would be evicted by the next insert of a new key
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let tail = self._slab.tail()?;
        self._slab.get(tail).map(|e| (&e.key, &e.val))
    }
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self._hmap.contains_key(key)
    }
    pub fn make_head<Q: ?Sized>(&mut self, key: &Q) -> Result<(), Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        match self._hmap.get(key) {
            None => Err(Error::KeyNotFound),
            Some(idx) => {
                self._slab.make_head(*idx);
                Ok(())
            }
        }
    }
    /// Remove a key. This is not an eviction, the listener is not called
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let idx = self._hmap.remove(key)?;
        self._slab.remove(idx).map(|e| e.val)
    }
    pub fn clear(&mut self) {
        self._hmap.clear();
        self._slab.clear();
    }
    pub fn len(&self) -> usize {
        self._hmap.len()
    }
    pub fn is_empty(&self) -> bool {
        self._hmap.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self._capacity
    }
    /// Iterate from the most recently used to the least recently used
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self._slab.iter().map(|e| (&e.key, &e.val))
    }
}
