//! A binary min-heap whose elements can be modified or removed after insertion.
//!
//! Every pushed element gets a [`Handle`]. The heap keeps two index layers in sync on every swap:
//! `handles` maps a heap slot to the handle living there and `slots` maps a handle back to its
//! current heap slot. That lets a caller find, update, or remove an element in O(log n) without
//! knowing where sifting has moved it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use crate::error::{Error, Result};

/// Identifies one element of an [`IndexedHeap`] from the moment it is pushed until it is popped
/// or removed. Handle numbers are reused afterwards, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Min-heap ordered by `T`'s `Ord`. Elements that compare equal come out in no particular order.
#[derive(Debug, Clone)]
pub struct IndexedHeap<T> {
    heap: Vec<T>,
    // heap slot -> handle number
    handles: Vec<usize>,
    // handle number -> heap slot, None while the handle is vacant
    slots: Vec<Option<usize>>,
    vacant: BinaryHeap<Reverse<usize>>,
}

impl<T: Ord> Default for IndexedHeap<T> {
    fn default() -> Self {
        IndexedHeap::new()
    }
}

impl<T: Ord> IndexedHeap<T> {
    pub fn new() -> IndexedHeap<T> {
        IndexedHeap {
            heap: Vec::new(),
            handles: Vec::new(),
            slots: Vec::new(),
            vacant: BinaryHeap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every element and invalidate every handle.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.handles.clear();
        self.slots.clear();
        self.vacant.clear();
    }

    /// The underlying array, in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.heap
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slot(handle).is_ok()
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        let slot = self.slot(handle)?;
        Ok(&self.heap[slot])
    }

    /// Insert an element, returning the handle that addresses it until it leaves the heap.
    pub fn push(&mut self, item: T) -> Handle {
        let handle = match self.vacant.pop() {
            Some(Reverse(handle)) => handle,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };

        let slot = self.heap.len();
        self.slots[handle] = Some(slot);
        self.heap.push(item);
        self.handles.push(handle);
        self.sift_up(slot);

        Handle(handle)
    }

    /// Remove and return the smallest element. Its handle becomes invalid.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(0, last);
        let item = self.detach_last();

        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    /// Replace the element behind `handle`, returning the previous one.
    ///
    /// The new element sifts towards the root if it is smaller, towards the leaves if it is
    /// larger, and stays put if it compares equal.
    pub fn update(&mut self, handle: Handle, item: T) -> Result<T> {
        let slot = self.slot(handle)?;
        let previous = std::mem::replace(&mut self.heap[slot], item);

        match self.heap[slot].cmp(&previous) {
            Ordering::Less => self.sift_up(slot),
            Ordering::Greater => self.sift_down(slot),
            Ordering::Equal => {}
        }

        Ok(previous)
    }

    /// Remove an arbitrary element by handle.
    pub fn remove(&mut self, handle: Handle) -> Result<T> {
        let slot = self.slot(handle)?;
        let last = self.heap.len() - 1;

        self.swap(slot, last);
        let removed = self.detach_last();

        // Whatever was last now sits in the hole and may need to move either way
        if slot < self.heap.len() {
            match self.heap[slot].cmp(&removed) {
                Ordering::Less => self.sift_up(slot),
                Ordering::Greater => self.sift_down(slot),
                Ordering::Equal => {}
            }
        }

        Ok(removed)
    }

    fn slot(&self, handle: Handle) -> Result<usize> {
        self.slots
            .get(handle.0)
            .copied()
            .flatten()
            .ok_or(Error::InvalidHandle(handle))
    }

    // Pop the last slot off all three layers and recycle its handle
    fn detach_last(&mut self) -> T {
        let handle = self.handles.pop().expect("handles out of sync with heap");
        self.slots[handle] = None;
        self.vacant.push(Reverse(handle));
        self.heap.pop().expect("heap is not empty")
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }

        self.heap.swap(a, b);
        self.handles.swap(a, b);
        self.slots[self.handles[a]] = Some(a);
        self.slots[self.handles[b]] = Some(b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot] >= self.heap[parent] {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();

        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            if left >= len {
                break;
            }

            let smaller = if right < len && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };

            if self.heap[slot] <= self.heap[smaller] {
                break;
            }
            self.swap(slot, smaller);
            slot = smaller;
        }
    }
}

/// Builds the heap bottom-up. The n-th element of the iterator gets `Handle(n)`.
impl<T: Ord> FromIterator<T> for IndexedHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let heap = iter.into_iter().collect::<Vec<_>>();
        let count = heap.len();

        let mut result = IndexedHeap {
            heap,
            handles: (0..count).collect(),
            slots: (0..count).map(Some).collect(),
            vacant: BinaryHeap::new(),
        };

        for slot in (0..count / 2).rev() {
            result.sift_down(slot);
        }
        result
    }
}

impl<T: Ord> Extend<T> for IndexedHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
