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

#[derive(::thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Key not found in lru")]
    KeyNotFound,
    #[error(
        "Invalid cache capacity {capacity}: must be at least 1 and leave \
         room for the hashmap headroom"
    )]
    InvalidCapacity { capacity: usize },
}

/// What happened to the cache on an insert
#[derive(Debug, PartialEq, Eq)]
pub enum InsertResult<K, V> {
    /// The key was already present: this is the value we replaced
    OldEntry(V),
    /// The cache was full: this is the least recently used entry we evicted
    OldTail(K, V),
    /// New key, nothing replaced or evicted
    Success,
}
