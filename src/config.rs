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

use crate::results::Error;
use crate::sync::Cache;
use ::std::hash::Hash;

pub const DEFAULT_CAPACITY: usize = 1024;

/// Cache settings, meant to be embedded in the host configuration
///
/// ```rust
/// use lookup_cache::CacheConfig;
///
/// let cache = CacheConfig::default()
///     .with_capacity(128)
///     .build::<String, String>()
///     .unwrap();
/// assert_eq!(cache.capacity(), 128);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, ::serde::Deserialize, ::serde::Serialize,
)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries. Must be at least 1
    #[serde(rename = "cache_capacity")]
    pub capacity: usize,
    /// Headroom allocated in the hashmap on top of `capacity`
    pub extra_hashmap_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: DEFAULT_CAPACITY,
            extra_hashmap_capacity: 0,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
    pub fn with_extra_hashmap_capacity(mut self, extra: usize) -> Self {
        self.extra_hashmap_capacity = extra;
        self
    }
    /// Check the settings without building anything, so that a bad
    /// configuration can stop the startup early
    pub fn validate(&self) -> Result<(), Error> {
        let overflow = self
            .capacity
            .checked_add(self.extra_hashmap_capacity)
            .is_none();
        if self.capacity < 1 || overflow {
            return Err(Error::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
    pub fn build<K, V>(&self) -> Result<Cache<K, V>, Error>
    where
        K: Hash + Clone + Eq,
        V: Clone,
    {
        self.validate()?;
        Cache::with_listener_and_hasher(
            self.capacity,
            self.extra_hashmap_capacity,
            crate::user::ZeroListener {},
            ::hashbrown::hash_map::DefaultHashBuilder::default(),
        )
    }
}
