use fixedbitset::FixedBitSet;
use std::fmt;
use std::ops::RangeInclusive;

/// A set of small integer identifiers (purposes, special features, vendors).
///
/// Backed by a bitset, so membership is O(1) and a set covering all 65536 possible ids
/// takes 8 KiB. Two sets are equal when they hold the same ids, regardless of the capacity
/// they were allocated with.
#[derive(Clone, Default)]
pub struct IdSet(FixedBitSet);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set able to hold ids up to `max_id` without reallocating.
    pub fn with_max_id(max_id: u16) -> Self {
        Self(FixedBitSet::with_capacity(usize::from(max_id) + 1))
    }

    /// Adds an id to the set. Returns whether it was newly inserted.
    pub fn insert(&mut self, id: u16) -> bool {
        let bit = usize::from(id);
        self.reserve(bit + 1);
        !self.0.put(bit)
    }

    /// Adds every id of an inclusive range. An empty range is a no-op.
    pub fn insert_range(&mut self, ids: RangeInclusive<u16>) {
        if ids.is_empty() {
            return;
        }
        let (start, end) = (usize::from(*ids.start()), usize::from(*ids.end()));
        self.reserve(end + 1);
        self.0.insert_range(start..end + 1);
    }

    /// Removes an id from the set. Returns whether it was present.
    pub fn remove(&mut self, id: u16) -> bool {
        let bit = usize::from(id);
        if !self.0.contains(bit) {
            return false;
        }
        self.0.set(bit, false);
        true
    }

    /// Removes every id of an inclusive range.
    pub fn remove_range(&mut self, ids: RangeInclusive<u16>) {
        if ids.is_empty() || self.0.len() == 0 {
            return;
        }
        let start = usize::from(*ids.start());
        let end = usize::from(*ids.end()).min(self.0.len() - 1);
        if start <= end {
            self.0.set_range(start..end + 1, false);
        }
    }

    pub fn contains(&self, id: u16) -> bool {
        self.0.contains(usize::from(id))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_clear()
    }

    /// Iterates over the ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        // capacity never exceeds u16::MAX + 1
        self.0.ones().map(|bit| bit as u16)
    }

    fn reserve(&mut self, bits: usize) {
        if bits > self.0.len() {
            self.0.grow(bits);
        }
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.ones().eq(other.0.ones())
    }
}

impl Eq for IdSet {}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u16> for IdSet {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<u16> for IdSet {
    fn extend<T: IntoIterator<Item = u16>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<const N: usize> From<[u16; N]> for IdSet {
    fn from(ids: [u16; N]) -> Self {
        ids.into_iter().collect()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for IdSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IdSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = <Vec<u16> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(ids.into_iter().collect())
    }
}
