use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ai::fixed_math::FixedNum;

/// Binary min-heap with decrease-key, used as the A* open set.
///
/// Each item appears at most once; its slot is tracked so a better key can
/// be pushed without leaving stale entries behind.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<K> {
    items: Vec<(K, FixedNum)>,
    slots: FxHashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> Default for IndexedMinHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> IndexedMinHeap<K> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            slots: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &K) -> bool {
        self.slots.contains_key(item)
    }

    pub fn key_of(&self, item: &K) -> Option<FixedNum> {
        self.slots.get(item).map(|&slot| self.items[slot].1)
    }

    pub fn peek(&self) -> Option<(K, FixedNum)> {
        self.items.first().copied()
    }

    /// Insert `item`, or lower its key if already queued with a higher one.
    /// Returns false when the existing key was already at least as good.
    pub fn push_or_decrease(&mut self, item: K, key: FixedNum) -> bool {
        match self.slots.get(&item).copied() {
            Some(slot) => {
                if key >= self.items[slot].1 {
                    return false;
                }
                self.items[slot].1 = key;
                self.sift_up(slot);
                true
            }
            None => {
                let slot = self.items.len();
                self.items.push((item, key));
                self.slots.insert(item, slot);
                self.sift_up(slot);
                true
            }
        }
    }

    pub fn pop_min(&mut self) -> Option<(K, FixedNum)> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.swap(0, last);
        let (item, key) = self.items.pop()?;
        self.slots.remove(&item);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some((item, key))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.slots.clear();
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.items.swap(a, b);
        self.slots.insert(self.items[a].0, a);
        self.slots.insert(self.items[b].0, b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.items[slot].1 >= self.items[parent].1 {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.items[left].1 < self.items[smallest].1 {
                smallest = left;
            }
            if right < len && self.items[right].1 < self.items[smallest].1 {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}
