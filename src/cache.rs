//! Computed value cache.
//!
//! A pure memoization layer over (item, attribute) pairs with explicit
//! invalidation. The cache carries no correctness logic of its own; its
//! single invariant is that a stored value always equals what the
//! evaluator would recompute from the current affection index and catalog.

use crate::ident::{AttrId, ItemId};
use std::collections::HashMap;

/// Per-item map from attribute id to computed value.
///
/// # Examples
///
/// ```rust
/// use fitcalc::{AttrId, ItemId, ValueCache};
///
/// let mut cache = ValueCache::new();
/// cache.set(ItemId(1), AttrId(9), 120.0);
/// assert_eq!(cache.get(ItemId(1), AttrId(9)), Some(120.0));
///
/// cache.invalidate(ItemId(1), AttrId(9));
/// assert_eq!(cache.get(ItemId(1), AttrId(9)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueCache {
    values: HashMap<ItemId, HashMap<AttrId, f64>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for a pair, if present.
    pub fn get(&self, item: ItemId, attr: AttrId) -> Option<f64> {
        self.values.get(&item)?.get(&attr).copied()
    }

    /// Store a computed value.
    pub fn set(&mut self, item: ItemId, attr: AttrId, value: f64) {
        self.values.entry(item).or_default().insert(attr, value);
    }

    /// Drop a single pair. Returns whether an entry existed.
    pub fn invalidate(&mut self, item: ItemId, attr: AttrId) -> bool {
        match self.values.get_mut(&item) {
            Some(attrs) => attrs.remove(&attr).is_some(),
            None => false,
        }
    }

    /// Attributes currently cached for an item.
    pub fn cached_attrs(&self, item: ItemId) -> Vec<AttrId> {
        self.values
            .get(&item)
            .map(|attrs| attrs.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Drop every entry for an item. Used on removal and reload.
    pub fn invalidate_item(&mut self, item: ItemId) {
        self.values.remove(&item);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
