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

/// The trait Listener defines operations that will be run on certain
/// operations of the LRU
///
/// Callbacks are run while the cache is locked, so keep them short and
/// never call back into the same cache from here.
pub trait Listener<K, V> {
    /// run every time the least recently used entry is pushed out to make
    /// room for a new key.
    /// Explicit `remove` or `clear` do not count as evictions
    fn on_evict(&mut self, key: &K, val: &V);
}

/// The simplest of implementation for a listener:
/// don't take up space and don't do anything
#[derive(Default, Debug, Clone, Copy)]
pub struct ZeroListener {}

impl<K, V> Listener<K, V> for ZeroListener {
    fn on_evict(&mut self, _key: &K, _val: &V) {}
}

impl<K, V, F> Listener<K, V> for F
where
    F: FnMut(&K, &V),
{
    fn on_evict(&mut self, key: &K, val: &V) {
        self(key, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_listener_receives_evicted_pair() {
        let mut seen = Vec::new();
        {
            let mut l = |k: &&str, v: &u32| seen.push((k.to_string(), *v));
            Listener::on_evict(&mut l, &"a", &1);
            Listener::on_evict(&mut l, &"b", &2);
        }
        assert_eq!(seen, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }
}
