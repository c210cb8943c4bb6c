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

//! A bounded, thread-safe LRU cache to put in front of a slow lookup store
//!
//! # Usage
//! The cache is meant to absorb repeated reads of hot keys:
//! on a miss the caller asks its own store, then populates the cache.
//! The cache never talks to the store by itself.
//!
//! ```rust
//! use lookup_cache::Cache;
//!
//! let cache = Cache::new(2).unwrap();
//! cache.set("a".to_string(), "va".to_string());
//! cache.set("b".to_string(), "vb".to_string());
//! assert_eq!(cache.get("a"), Some("va".to_string()));
//! // "b" is now the least recently used
//! cache.set("c".to_string(), "vc".to_string());
//! assert_eq!(cache.get("b"), None);
//! ```
//!
//! # Multithread
//! [`Cache`] keeps the hashmap and the recency list behind a single lock.
//! If you only have one thread, use [`lru::LRU`] directly.
//!
//! # No pointers
//! The recency list is kept in a [`slab`] and linked by index, so there is no
//! `unsafe` in here.

#![forbid(unsafe_code)]

pub mod config;
pub mod lru;
/// common result for insert/get operations
pub mod results;
pub mod slab;
pub mod sync;
/// callbacks run by the cache on its entries
pub mod user;

pub use crate::config::CacheConfig;
pub use crate::results::{Error, InsertResult};
pub use crate::sync::{Cache, Lookup, Stats};
