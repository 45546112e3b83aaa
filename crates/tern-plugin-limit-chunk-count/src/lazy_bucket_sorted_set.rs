//! Sorted set with layered buckets and lazy insertion.
//!
//! Items are bucketed by one key per layer and ordered inside the last layer
//! by a leaf key. Newly added items are parked in an unsorted pool and only
//! placed into their buckets when [`LazyBucketSortedSet::pop_first`] runs, so
//! bulk inserts followed by few pops stay cheap.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Sort keys of the items stored in a [`LazyBucketSortedSet`].
///
/// Smaller keys pop first on every layer.
pub(crate) trait BucketKeys<T> {
    /// Number of bucket layers above the leaves.
    fn depth(&self) -> usize;

    fn bucket_key(&self, item: &T, layer: usize) -> i64;

    fn leaf_key(&self, item: &T) -> i64;
}

#[derive(Debug)]
pub(crate) struct LazyBucketSortedSet<T> {
    layer: usize,
    map: BTreeMap<i64, Bucket<T>>,
    unsorted: FxHashSet<T>,
    size: usize,
}

#[derive(Debug)]
enum Bucket<T> {
    Leaf(BTreeSet<(i64, T)>),
    Node(LazyBucketSortedSet<T>),
}

impl<T> Bucket<T> {
    fn is_empty(&self) -> bool {
        match self {
            Bucket::Leaf(items) => items.is_empty(),
            Bucket::Node(inner) => inner.size == 0,
        }
    }
}

/// Where an item was sorted before its keys changed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    buckets: Vec<i64>,
    leaf: i64,
}

/// Handle returned by [`LazyBucketSortedSet::start_update`].
#[must_use = "pass the update to `finish_update`"]
#[derive(Debug)]
pub(crate) struct PendingUpdate<T> {
    item: T,
    /// `None` while the item still sits in the unsorted pool.
    position: Option<Position>,
}

impl<T> Default for LazyBucketSortedSet<T> {
    fn default() -> Self {
        Self::with_layer(0)
    }
}

impl<T> LazyBucketSortedSet<T> {
    fn with_layer(layer: usize) -> Self {
        Self {
            layer,
            map: BTreeMap::new(),
            unsorted: FxHashSet::default(),
            size: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }
}

impl<T: Copy + Ord + Hash> LazyBucketSortedSet<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, item: T) {
        if self.unsorted.insert(item) {
            self.size += 1;
        }
    }

    /// Remove `item`, locating it with its current keys. Returns whether it
    /// was present.
    pub(crate) fn delete<K: BucketKeys<T>>(&mut self, item: &T, keys: &K) -> bool {
        if self.unsorted.remove(item) {
            self.size -= 1;
            return true;
        }
        let position = position_of(item, keys);
        self.remove_at(item, &position)
    }

    /// Sort pending items, then remove and return the smallest one.
    pub(crate) fn pop_first<K: BucketKeys<T>>(&mut self, keys: &K) -> Option<T> {
        if !self.unsorted.is_empty() {
            let pending: Vec<T> = self.unsorted.drain().collect();
            self.size -= pending.len();
            for item in pending {
                let position = position_of(&item, keys);
                self.insert_sorted(item, &position);
            }
        }
        self.pop_sorted()
    }

    /// Capture where `item` is sorted before its keys are mutated.
    pub(crate) fn start_update<K: BucketKeys<T>>(&self, item: T, keys: &K) -> PendingUpdate<T> {
        let position = if self.unsorted.contains(&item) {
            None
        } else {
            Some(position_of(&item, keys))
        };
        PendingUpdate { item, position }
    }

    /// Move an updated item out of its old bucket. It is re-sorted with its
    /// new keys on the next pop.
    pub(crate) fn finish_update(&mut self, update: PendingUpdate<T>) {
        let PendingUpdate { item, position } = update;
        let Some(position) = position else {
            return;
        };
        if self.remove_at(&item, &position) {
            self.add(item);
        }
    }

    fn insert_sorted(&mut self, item: T, position: &Position) {
        self.size += 1;
        let key = position.buckets.get(self.layer).copied().unwrap_or_default();
        let is_last = self.layer + 1 >= position.buckets.len();
        let layer = self.layer;
        let bucket = self.map.entry(key).or_insert_with(|| {
            if is_last {
                Bucket::Leaf(BTreeSet::new())
            } else {
                Bucket::Node(Self::with_layer(layer + 1))
            }
        });
        match bucket {
            Bucket::Leaf(items) => {
                items.insert((position.leaf, item));
            }
            Bucket::Node(inner) => inner.insert_sorted(item, position),
        }
    }

    fn remove_at(&mut self, item: &T, position: &Position) -> bool {
        let key = position.buckets.get(self.layer).copied().unwrap_or_default();
        let Some(bucket) = self.map.get_mut(&key) else {
            return false;
        };
        let removed = match bucket {
            Bucket::Leaf(items) => items.remove(&(position.leaf, *item)),
            Bucket::Node(inner) => inner.remove_at(item, position),
        };
        if removed {
            self.size -= 1;
            if bucket.is_empty() {
                self.map.remove(&key);
            }
        }
        removed
    }

    fn pop_sorted(&mut self) -> Option<T> {
        let mut entry = self.map.first_entry()?;
        let item = match entry.get_mut() {
            Bucket::Leaf(items) => items.pop_first().map(|(_, item)| item),
            Bucket::Node(inner) => inner.pop_sorted(),
        };
        if entry.get().is_empty() {
            entry.remove();
        }
        if item.is_some() {
            self.size -= 1;
        }
        item
    }
}

fn position_of<T, K: BucketKeys<T>>(item: &T, keys: &K) -> Position {
    Position {
        buckets: (0..keys.depth())
            .map(|layer| keys.bucket_key(item, layer))
            .collect(),
        leaf: keys.leaf_key(item),
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use super::*;

    /// (first, second, leaf) keys per item.
    #[derive(Default)]
    struct Keys(FxHashMap<u32, (i64, i64, i64)>);

    impl BucketKeys<u32> for Keys {
        fn depth(&self) -> usize {
            2
        }

        fn bucket_key(&self, item: &u32, layer: usize) -> i64 {
            let (first, second, _) = self.0[item];
            if layer == 0 { first } else { second }
        }

        fn leaf_key(&self, item: &u32) -> i64 {
            self.0[item].2
        }
    }

    fn drain(set: &mut LazyBucketSortedSet<u32>, keys: &Keys) -> Vec<u32> {
        std::iter::from_fn(|| set.pop_first(keys)).collect()
    }

    #[test]
    fn pops_in_layer_order() {
        let mut keys = Keys::default();
        keys.0.insert(1, (2, 0, 0));
        keys.0.insert(2, (1, 5, 0));
        keys.0.insert(3, (1, 3, 7));
        keys.0.insert(4, (1, 3, 2));

        let mut set = LazyBucketSortedSet::new();
        for item in [1, 2, 3, 4] {
            set.add(item);
        }
        assert_eq!(set.len(), 4);
        assert_eq!(drain(&mut set, &keys), [4, 3, 2, 1]);
        assert_eq!(set.len(), 0);
        assert_eq!(set.pop_first(&keys), None);
    }

    #[test]
    fn delete_works_for_sorted_and_unsorted_items() {
        let mut keys = Keys::default();
        for item in 1..=4 {
            keys.0.insert(item, (i64::from(item), 0, 0));
        }

        let mut set = LazyBucketSortedSet::new();
        set.add(1);
        set.add(2);
        assert_eq!(set.pop_first(&keys), Some(1));

        set.add(3);
        set.add(4);
        assert!(set.delete(&4, &keys));
        assert!(!set.delete(&4, &keys));
        assert!(set.delete(&2, &keys));
        assert_eq!(set.len(), 1);
        assert_eq!(drain(&mut set, &keys), [3]);
    }

    #[test]
    fn updates_resort_items_with_new_keys() {
        let mut keys = Keys::default();
        keys.0.insert(1, (0, 0, 0));
        keys.0.insert(2, (1, 0, 0));
        keys.0.insert(3, (2, 0, 0));

        let mut set = LazyBucketSortedSet::new();
        for item in [1, 2, 3] {
            set.add(item);
        }
        assert_eq!(set.pop_first(&keys), Some(1));

        let update = set.start_update(3, &keys);
        keys.0.insert(3, (-1, 0, 0));
        set.finish_update(update);

        assert_eq!(set.len(), 2);
        assert_eq!(drain(&mut set, &keys), [3, 2]);
    }

    #[test]
    fn updating_an_unsorted_item_keeps_it() {
        let mut keys = Keys::default();
        keys.0.insert(1, (5, 0, 0));
        keys.0.insert(2, (3, 0, 0));

        let mut set = LazyBucketSortedSet::new();
        set.add(1);
        set.add(2);

        let update = set.start_update(1, &keys);
        keys.0.insert(1, (0, 0, 0));
        set.finish_update(update);

        assert_eq!(drain(&mut set, &keys), [1, 2]);
    }
}
