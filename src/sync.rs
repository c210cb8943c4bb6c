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

//! Thread-safe LRU
//!
//! The hashmap and the recency list must always change together, so the
//! whole [`LRU`] sits behind a single [`parking_lot::Mutex`].
//! Every operation, `get` included, takes the lock for its whole duration:
//! a `get` hit reorders the list.

use crate::lru::LRU;
use crate::results::{Error, InsertResult};
use crate::user;
use ::parking_lot::Mutex;
use ::std::borrow::Borrow;
use ::std::hash::{BuildHasher, Hash};
use ::std::sync::Arc;

/// Counters since the cache was created, plus the current fill level
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, ::serde::Serialize,
)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

struct Inner<K, V, L, HB> {
    lru: LRU<K, V, L, HB>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// The capability the request handlers depend on.
///
/// Object safe, so it can be shared as `Arc<dyn Lookup<String, String>>`
pub trait Lookup<K, V>: Send + Sync {
    /// `None` on a miss. A hit makes the key the most recently used
    fn get(&self, key: &K) -> Option<V>;
    /// Insert or overwrite. Never fails: a full cache evicts instead
    fn set(&self, key: K, val: V);
}

/// Bounded LRU cache shareable between threads.
///
/// Cloning is cheap and gives another handle to the same cache.
/// Values are returned by clone, never by reference, so no caller can
/// hold on to the internals after the lock is released.
pub struct Cache<
    K,
    V,
    L = user::ZeroListener,
    HB = ::hashbrown::hash_map::DefaultHashBuilder,
> {
    _inner: Arc<Mutex<Inner<K, V, L, HB>>>,
    // fixed at construction, readable without the lock
    _capacity: usize,
}

impl<K, V, L, HB> Clone for Cache<K, V, L, HB> {
    fn clone(&self) -> Self {
        Cache {
            _inner: Arc::clone(&self._inner),
            _capacity: self._capacity,
        }
    }
}

impl<K: Hash + Clone + Eq, V: Clone> Cache<K, V> {
    /// Fails with [`Error::InvalidCapacity`] if `capacity` is 0
    pub fn new(capacity: usize) -> Result<Cache<K, V>, Error> {
        Cache::with_listener_and_hasher(
            capacity,
            0,
            user::ZeroListener {},
            ::hashbrown::hash_map::DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, L> Cache<K, V, L>
where
    K: Hash + Clone + Eq,
    V: Clone,
    L: user::Listener<K, V>,
{
    pub fn with_listener(
        capacity: usize,
        listener: L,
    ) -> Result<Cache<K, V, L>, Error> {
        Cache::with_listener_and_hasher(
            capacity,
            0,
            listener,
            ::hashbrown::hash_map::DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, L, HB> Cache<K, V, L, HB>
where
    K: Hash + Clone + Eq,
    V: Clone,
    L: user::Listener<K, V>,
    HB: BuildHasher,
{
    pub fn with_listener_and_hasher(
        capacity: usize,
        extra_hashmap_capacity: usize,
        listener: L,
        hash_builder: HB,
    ) -> Result<Cache<K, V, L, HB>, Error> {
        let lru = LRU::with_listener_and_hasher(
            capacity,
            extra_hashmap_capacity,
            listener,
            hash_builder,
        )?;
        ::tracing::debug!(capacity, "lru cache created");
        Ok(Cache {
            _inner: Arc::new(Mutex::new(Inner {
                lru: lru,
                hits: 0,
                misses: 0,
                evictions: 0,
            })),
            _capacity: capacity,
        })
    }
    /// Get a copy of the value, promoting the key to most recently used.
    /// A miss leaves the cache untouched
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let mut inner = self._inner.lock();
        let found = inner.lru.get(key).cloned();
        match found {
            Some(val) => {
                inner.hits += 1;
                ::tracing::trace!("cache hit");
                Some(val)
            }
            None => {
                inner.misses += 1;
                ::tracing::trace!("cache miss");
                None
            }
        }
    }
    pub fn set(&self, key: K, val: V) {
        let mut inner = self._inner.lock();
        let res = inner.lru.insert(key, val);
        if let InsertResult::OldTail(_, _) = res {
            inner.evictions += 1;
        }
    }
    /// Return the cached value, or run `loader` and cache what it returns.
    ///
    /// The lock is not held while `loader` runs, so two threads missing on
    /// the same key may both load it; the last `set` wins.
    /// Errors from `loader` are returned as-is and nothing is cached
    pub fn get_or_try_insert_with<F, E>(
        &self,
        key: K,
        loader: F,
    ) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(val) = self.get(&key) {
            return Ok(val);
        }
        let val = loader(&key)?;
        self.set(key, val.clone());
        Ok(val)
    }
    pub fn remove<Q: ?Sized>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self._inner.lock().lru.remove(key)
    }
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self._inner.lock().lru.contains_key(key)
    }
    /// Drop every entry. Counters are kept
    pub fn clear(&self) {
        self._inner.lock().lru.clear()
    }
    pub fn len(&self) -> usize {
        self._inner.lock().lru.len()
    }
    pub fn is_empty(&self) -> bool {
        self._inner.lock().lru.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self._capacity
    }
    /// Snapshot of the keys, most recently used first
    pub fn keys(&self) -> Vec<K> {
        self._inner.lock().lru.iter().map(|(k, _)| k.clone()).collect()
    }
    pub fn stats(&self) -> Stats {
        let inner = self._inner.lock();
        Stats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            len: inner.lru.len(),
            capacity: self._capacity,
        }
    }
}

impl<K, V, L, HB> Lookup<K, V> for Cache<K, V, L, HB>
where
    K: Hash + Clone + Eq + Send,
    V: Clone + Send,
    L: user::Listener<K, V> + Send,
    HB: BuildHasher + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }
    fn set(&self, key: K, val: V) {
        Cache::set(self, key, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_hits_misses_evictions() {
        let cache = Cache::new(2).unwrap();
        cache.set("a".to_string(), 1u32);
        cache.set("b".to_string(), 2);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("x"), None);
        cache.set("c".to_string(), 3);
        cache.set("c".to_string(), 4);

        assert_eq!(
            cache.stats(),
            Stats {
                hits: 1,
                misses: 1,
                evictions: 1,
                len: 2,
                capacity: 2,
            }
        );
        assert_eq!(cache.keys(), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn clones_share_state() {
        let cache = Cache::new(4).unwrap();
        let other = cache.clone();
        other.set(1u64, "one".to_string());
        assert_eq!(cache.get(&1u64), Some("one".to_string()));
        cache.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn read_through_only_loads_on_miss() {
        let cache = Cache::new(2).unwrap();
        let mut loads = 0;
        let v: Result<String, ()> =
            cache.get_or_try_insert_with(7u64, |id| {
                loads += 1;
                Ok(format!("value-{}", id))
            });
        assert_eq!(v, Ok("value-7".to_string()));
        let v: Result<String, ()> =
            cache.get_or_try_insert_with(7u64, |_| {
                loads += 1;
                Ok("other".to_string())
            });
        assert_eq!(v, Ok("value-7".to_string()));
        assert_eq!(loads, 1);
    }

    #[test]
    fn read_through_error_caches_nothing() {
        let cache: Cache<u64, String> = Cache::new(2).unwrap();
        let res = cache.get_or_try_insert_with(1, |_| Err("store down"));
        assert_eq!(res, Err("store down"));
        assert!(!cache.contains_key(&1u64));
    }

    #[test]
    fn usable_as_trait_object() {
        let cache: Arc<dyn Lookup<String, String>> =
            Arc::new(Cache::<String, String>::new(1).unwrap());
        cache.set("k".to_string(), "v".to_string());
        assert_eq!(cache.get(&"k".to_string()), Some("v".to_string()));
        cache.set("k2".to_string(), "v2".to_string());
        assert_eq!(cache.get(&"k".to_string()), None);
    }

    #[test]
    fn capacity_does_not_need_the_lock() {
        let cache: Cache<u32, u32> = Cache::new(3).unwrap();
        let _guard = cache._inner.lock();
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.clone().capacity(), 3);
    }

    #[test]
    fn panicking_listener_leaves_cache_usable() {
        let cache: Cache<u32, u32, _> =
            Cache::with_listener(2, |k: &u32, _: &u32| {
                if *k == 1 {
                    panic!("listener failure on {}", k);
                }
            })
            .unwrap();
        cache.set(1, 1);
        cache.set(2, 2);

        let other = cache.clone();
        let res = ::std::panic::catch_unwind(
            ::std::panic::AssertUnwindSafe(move || other.set(3, 3)),
        );
        assert!(res.is_err());

        assert!(cache.len() <= cache.capacity());
        assert_eq!(cache.keys().len(), cache.len());
        assert_eq!(cache.keys(), vec![3, 2]);
        cache.set(4, 4);
        assert_eq!(cache.get(&4u32), Some(4));
        assert_eq!(cache.get(&3u32), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn listener_runs_under_the_lock() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let cache: Cache<u32, u32, _> =
            Cache::with_listener(1, move |k: &u32, _: &u32| {
                sink.lock().push(*k)
            })
            .unwrap();
        cache.set(1, 1);
        cache.set(2, 2);
        cache.set(3, 3);
        assert_eq!(*evicted.lock(), vec![1, 2]);
        assert_eq!(cache.remove(&3u32), Some(3));
        assert_eq!(cache.len(), 0);
    }
}
