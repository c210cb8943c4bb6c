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

//! Doubly linked list stored in a vector of slots
//!
//! Every element is addressed by a stable [`SlabIdx`]: inserting or removing
//! other elements never moves it, so the index can be kept in a hashmap and
//! used later for O(1) reordering.
//! Freed slots are recycled through a free list, so once the slab has grown
//! to the cache capacity it never allocates again.

/// Stable handle to one slot of the [`Slab`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlabIdx(usize);

struct Node<T> {
    // linked list towards head
    ll_head: Option<SlabIdx>,
    // linked list towards tail
    ll_tail: Option<SlabIdx>,
    val: T,
}

pub struct Slab<T> {
    _slots: Vec<Option<Node<T>>>,
    _free: Vec<usize>,
    _head: Option<SlabIdx>,
    _tail: Option<SlabIdx>,
    _len: usize,
}

impl<T> Slab<T> {
    pub fn with_capacity(capacity: usize) -> Slab<T> {
        Slab {
            _slots: Vec::with_capacity(capacity),
            _free: Vec::with_capacity(capacity),
            _head: None,
            _tail: None,
            _len: 0,
        }
    }
    pub fn len(&self) -> usize {
        self._len
    }
    pub fn is_empty(&self) -> bool {
        self._len == 0
    }
    /// most recently inserted or promoted element
    pub fn head(&self) -> Option<SlabIdx> {
        self._head
    }
    /// element that has been left alone the longest
    pub fn tail(&self) -> Option<SlabIdx> {
        self._tail
    }
    pub fn get(&self, idx: SlabIdx) -> Option<&T> {
        self.node(idx).map(|n| &n.val)
    }
    pub fn get_mut(&mut self, idx: SlabIdx) -> Option<&mut T> {
        self.node_mut(idx).map(|n| &mut n.val)
    }
    /// Add a new element as the head of the list
    pub fn push_head(&mut self, val: T) -> SlabIdx {
        let node = Node {
            ll_head: None,
            ll_tail: None,
            val: val,
        };
        let idx = match self._free.pop() {
            Some(free) => {
                self._slots[free] = Some(node);
                SlabIdx(free)
            }
            None => {
                self._slots.push(Some(node));
                SlabIdx(self._slots.len() - 1)
            }
        };
        self.link_head(idx);
        self._len += 1;
        idx
    }
    /// Unlink the element and free its slot.
    /// `None` if the slot was already free
    pub fn remove(&mut self, idx: SlabIdx) -> Option<T> {
        let node = self._slots.get_mut(idx.0)?.take()?;
        self.unlink(node.ll_head, node.ll_tail);
        self._free.push(idx.0);
        self._len -= 1;
        Some(node.val)
    }
    pub fn pop_tail(&mut self) -> Option<T> {
        let tail = self._tail?;
        self.remove(tail)
    }
    /// Move the element to the head of the list.
    /// Returns `false` if the slot was free
    pub fn make_head(&mut self, idx: SlabIdx) -> bool {
        let (towards_head, towards_tail) = match self.node(idx) {
            None => return false,
            Some(node) => (node.ll_head, node.ll_tail),
        };
        if towards_head.is_none() {
            // already the head, nothing to do
            return true;
        }
        self.unlink(towards_head, towards_tail);
        self.link_head(idx);
        true
    }
    pub fn clear(&mut self) {
        self._slots.clear();
        self._free.clear();
        self._head = None;
        self._tail = None;
        self._len = 0;
    }
    /// Iterate from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slab: self,
            next: self._head,
            remaining: self._len,
        }
    }

    fn node(&self, idx: SlabIdx) -> Option<&Node<T>> {
        self._slots.get(idx.0).and_then(|s| s.as_ref())
    }
    fn node_mut(&mut self, idx: SlabIdx) -> Option<&mut Node<T>> {
        self._slots.get_mut(idx.0).and_then(|s| s.as_mut())
    }
    // connect the two neighbours of an element to each other,
    // fixing head and tail if the element was one of them
    fn unlink(
        &mut self,
        towards_head: Option<SlabIdx>,
        towards_tail: Option<SlabIdx>,
    ) {
        match towards_head {
            None => self._head = towards_tail,
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.ll_tail = towards_tail;
                }
            }
        }
        match towards_tail {
            None => self._tail = towards_head,
            Some(t) => {
                if let Some(node) = self.node_mut(t) {
                    node.ll_head = towards_head;
                }
            }
        }
    }
    fn link_head(&mut self, idx: SlabIdx) {
        let old_head = self._head;
        if let Some(node) = self.node_mut(idx) {
            node.ll_head = None;
            node.ll_tail = old_head;
        }
        match old_head {
            None => self._tail = Some(idx),
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.ll_head = Some(idx);
                }
            }
        }
        self._head = Some(idx);
    }
}

pub struct Iter<'a, T> {
    slab: &'a Slab<T>,
    next: Option<SlabIdx>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.slab.node(self.next?)?;
        self.next = node.ll_tail;
        self.remaining -= 1;
        Some(&node.val)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
