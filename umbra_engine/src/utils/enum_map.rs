/// Fixed-size storage keyed by a closed enum.
///
/// Every key owns exactly one slot; the slot index comes from
/// `EnumKey::index`, which is checked against `EnumKey::COUNT` on each
/// access. Slots start empty and are filled as resources get created, so a
/// lookup of a not-yet-created entry is an error instead of a stale read.
///
/// # Example
///
/// ```ignore
/// let mut pipelines: EnumMap<PipelineKind, Pipeline> = EnumMap::new();
/// pipelines.insert(PipelineKind::Offscreen, offscreen);
/// let p = pipelines.try_get(PipelineKind::Offscreen)?;
/// ```

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

/// A closed enum usable as an `EnumMap` key
pub trait EnumKey: Copy + Eq + fmt::Debug + 'static {
    /// Number of variants
    const COUNT: usize;

    /// Every variant, in index order
    const ALL: &'static [Self];

    /// Dense index in `0..COUNT`
    fn index(self) -> usize;
}

pub struct EnumMap<K: EnumKey, V> {
    slots: Vec<Option<V>>,
    _key: PhantomData<K>,
}

impl<K: EnumKey, V> EnumMap<K, V> {
    /// Create a map with every slot empty
    pub fn new() -> Self {
        Self {
            slots: (0..K::COUNT).map(|_| None).collect(),
            _key: PhantomData,
        }
    }

    /// Create a map with every slot filled by `f`
    pub fn from_fn(mut f: impl FnMut(K) -> V) -> Self {
        let mut map = Self::new();
        for &key in K::ALL {
            map.insert(key, f(key));
        }
        map
    }

    /// Create a map with every slot filled by a fallible `f`, stopping at the first error
    pub fn try_from_fn(mut f: impl FnMut(K) -> Result<V>) -> Result<Self> {
        let mut map = Self::new();
        for &key in K::ALL {
            map.insert(key, f(key)?);
        }
        Ok(map)
    }

    fn slot(key: K) -> usize {
        let index = key.index();
        debug_assert!(index < K::COUNT, "{:?} maps to slot {} but only {} exist", key, index, K::COUNT);
        index
    }

    /// Store a value, returning the previous occupant
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.slots[Self::slot(key)].replace(value)
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        self.slots[Self::slot(key)].take()
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.slots[Self::slot(key)].as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots[Self::slot(key)].as_mut()
    }

    /// Like `get`, but an empty slot is an `Error::InvalidResource`
    pub fn try_get(&self, key: K) -> Result<&V> {
        self.get(key).ok_or_else(|| {
            Error::InvalidResource(format!("{:?} has not been created", key))
        })
    }

    pub fn try_get_mut(&mut self, key: K) -> Result<&mut V> {
        self.get_mut(key).ok_or_else(|| {
            Error::InvalidResource(format!("{:?} has not been created", key))
        })
    }

    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of filled slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every key has a value
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Filled slots in key order
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        K::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(&key, slot)| slot.as_ref().map(|value| (key, value)))
    }

    /// Filled values in key order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Empty every slot, dropping values in reverse key order
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            *slot = None;
        }
    }
}

impl<K: EnumKey, V> Default for EnumMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EnumKey, V: fmt::Debug> fmt::Debug for EnumMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: EnumKey, V> Drop for EnumMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "enum_map_tests.rs"]
mod tests;
