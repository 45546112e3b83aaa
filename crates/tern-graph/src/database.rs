//! Keyed arenas.
//!
//! Chunks and chunk groups point at each other. Instead of shared ownership
//! they are stored in a [`Database`] and referenced by [`Ukey`], a plain
//! integer that is cheap to copy, hash and order.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use crate::error::{GraphError, Result};
use crate::FxIndexMap;

static NEXT_UKEY: AtomicU32 = AtomicU32::new(1);

/// Process-unique key of an item stored in a [`Database`].
///
/// Keys are handed out in increasing order, so sorting by key sorts by
/// creation time.
pub struct Ukey<Item>(u32, PhantomData<fn() -> Item>);

impl<Item> Ukey<Item> {
    pub fn new() -> Self {
        Self(NEXT_UKEY.fetch_add(1, AtomicOrdering::Relaxed), PhantomData)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl<Item> Default for Ukey<Item> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: derives would put bounds on `Item`.
impl<Item> Clone for Ukey<Item> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Item> Copy for Ukey<Item> {}

impl<Item> PartialEq for Ukey<Item> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<Item> Eq for Ukey<Item> {}

impl<Item> PartialOrd for Ukey<Item> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Item> Ord for Ukey<Item> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<Item> Hash for Ukey<Item> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<Item> fmt::Debug for Ukey<Item> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ukey({})", self.0)
    }
}

/// An item that knows its own key.
pub trait DatabaseItem: Sized {
    /// Human readable item kind, used in lookup errors.
    const KIND: &'static str;

    fn ukey(&self) -> Ukey<Self>;
}

/// Insertion-ordered storage of items by [`Ukey`].
#[derive(Debug)]
pub struct Database<Item: DatabaseItem> {
    inner: FxIndexMap<Ukey<Item>, Item>,
}

impl<Item: DatabaseItem> Default for Database<Item> {
    fn default() -> Self {
        Self {
            inner: FxIndexMap::default(),
        }
    }
}

impl<Item: DatabaseItem> Database<Item> {
    /// Store an item, returning its key.
    pub fn add(&mut self, item: Item) -> Ukey<Item> {
        let ukey = item.ukey();
        self.inner.insert(ukey, item);
        ukey
    }

    pub fn get(&self, ukey: &Ukey<Item>) -> Option<&Item> {
        self.inner.get(ukey)
    }

    pub fn get_mut(&mut self, ukey: &Ukey<Item>) -> Option<&mut Item> {
        self.inner.get_mut(ukey)
    }

    /// Like [`Database::get`], but a missing key is an error.
    pub fn require(&self, ukey: &Ukey<Item>) -> Result<&Item> {
        self.inner.get(ukey).ok_or(GraphError::ItemNotFound {
            kind: Item::KIND,
            key: ukey.as_u32(),
        })
    }

    pub fn require_mut(&mut self, ukey: &Ukey<Item>) -> Result<&mut Item> {
        self.inner.get_mut(ukey).ok_or(GraphError::ItemNotFound {
            kind: Item::KIND,
            key: ukey.as_u32(),
        })
    }

    /// Remove an item, keeping the relative order of the rest.
    pub fn remove(&mut self, ukey: &Ukey<Item>) -> Option<Item> {
        self.inner.shift_remove(ukey)
    }

    pub fn contains(&self, ukey: &Ukey<Item>) -> bool {
        self.inner.contains_key(ukey)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Ukey<Item>> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Item> {
        self.inner.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.inner.values_mut()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
