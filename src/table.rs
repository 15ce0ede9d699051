//! Table: string-keyed map with separate chaining and bounded growth.

use crate::chain::{Chain, Linked, Links};
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

/// Initial bucket capacity when the caller sets none.
pub const DEFAULT_SIZE: usize = 1 << 10;
/// Default growth ceiling when the caller sets none.
pub const DEFAULT_MAX: usize = 1 << 13;
/// Hard ceiling on `max_size`; larger requests are clamped.
pub const ABSOLUTE_MAX: usize = 1 << 30;

/// Hash function over keys. Must be reproducible for a given key.
pub type HashFn = fn(&str) -> u32;

/// FNV-1a, 32-bit. The default hash; kept bit-exact so bucket placement
/// is deterministic across builds.
pub fn fnv1a(key: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in key.bytes() {
        h = (h ^ u32::from(b)).wrapping_mul(0x0100_0193);
    }
    h
}

/// Construction options. Unset fields fall back to the defaults during
/// capacity reconciliation (see `Table::new`).
#[derive(Clone, Copy, Default)]
pub struct TableOptions {
    size: Option<usize>,
    max_size: Option<usize>,
    hash: Option<HashFn>,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial bucket capacity. Zero is treated as unset.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Growth ceiling on bucket capacity; clamped to `ABSOLUTE_MAX`.
    /// Zero is treated as unset.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Replace the default FNV-1a hash.
    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .field("hash", &self.hash.map(|_| "fn"))
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableError {
    /// `max_size` was set explicitly below an explicit `size`.
    InvalidConfig { size: usize, max_size: usize },
    /// Bucket capacity is at its ceiling and a new distinct key arrived.
    /// The table stays valid; existing keys remain updatable.
    CapacityExhausted,
    /// `update_only` on a key that is not present.
    KeyNotFound,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::InvalidConfig { size, max_size } => write!(
                f,
                "invalid configuration: max_size ({max_size}) is smaller than size ({size})"
            ),
            TableError::CapacityExhausted => write!(f, "table is at maximum capacity"),
            TableError::KeyNotFound => write!(f, "key not found"),
        }
    }
}

impl std::error::Error for TableError {}

struct Entry<V> {
    key: Box<str>,
    payload: V,
    links: Links,
}

impl<V> Linked for Entry<V> {
    fn links(&self) -> &Links {
        &self.links
    }
    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// Physical bucket-array length for a logical capacity: `2*size - 1` is
/// odd, which reduces modulo bias from hash patterns favoring even
/// divisors.
fn buckets_for(size: usize) -> usize {
    2 * size - 1
}

/// String-keyed table with separate-chaining collision resolution.
///
/// Entries live in a slotmap arena; each bucket holds the collision chain
/// threaded through them (`None` = empty bucket). Growth doubles the
/// bucket capacity up to `max_capacity` and rehashes every entry in one
/// synchronous pass.
pub struct Table<V> {
    bucket_capacity: usize,
    max_capacity: usize,
    hash: HashFn,
    buckets: Vec<Option<Chain>>,
    slots: SlotMap<DefaultKey, Entry<V>>,
}

/// Reconcile the caller's options into `(bucket_capacity, max_capacity)`.
///
/// - size set, max unset: max = max(DEFAULT_MAX, size).
/// - size and max set with max < size: rejected.
/// - size unset: size = DEFAULT_SIZE, then shrunk to max if the caller's
///   max is smaller.
/// - max unset after the above: max = DEFAULT_MAX.
fn reconcile(options: &TableOptions) -> Result<(usize, usize), TableError> {
    let size = options.size.filter(|&s| s > 0);
    let mut max = options
        .max_size
        .filter(|&m| m > 0)
        .map(|m| m.min(ABSOLUTE_MAX));

    let mut size = match size {
        Some(s) => {
            match max {
                None => max = Some(s.max(DEFAULT_MAX)),
                Some(m) if m < s => {
                    return Err(TableError::InvalidConfig {
                        size: s,
                        max_size: m,
                    })
                }
                Some(_) => {}
            }
            s
        }
        None => DEFAULT_SIZE,
    };

    let max = match max {
        Some(m) => {
            // Only reachable when the caller set max but not size.
            if m < size {
                size = m;
            }
            m
        }
        None => DEFAULT_MAX,
    };

    Ok((size, max))
}

impl<V: Copy> Table<V> {
    /// Build a table from `options`. Fails only on contradictory capacity
    /// parameters.
    pub fn new(options: TableOptions) -> Result<Self, TableError> {
        let (bucket_capacity, max_capacity) = reconcile(&options)?;
        let hash = options.hash.unwrap_or(fnv1a);
        let mut buckets = Vec::new();
        buckets.resize_with(buckets_for(bucket_capacity), || None);
        Ok(Table {
            bucket_capacity,
            max_capacity,
            hash,
            buckets,
            slots: SlotMap::with_key(),
        })
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current logical bucket capacity (the physical array is `2n - 1`).
    pub fn capacity(&self) -> usize {
        self.bucket_capacity
    }

    /// Ceiling on bucket capacity; growth never exceeds it.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn bucket_index(&self, key: &str) -> usize {
        (self.hash)(key) as usize % buckets_for(self.bucket_capacity)
    }

    fn find_handle(&self, key: &str) -> Option<DefaultKey> {
        let chain = self.buckets[self.bucket_index(key)].as_ref()?;
        chain
            .iter(&self.slots)
            .find(|(_, entry)| &*entry.key == key)
            .map(|(h, _)| h)
    }

    /// Look up `key` and return its payload, or `None` if absent.
    pub fn search(&self, key: &str) -> Option<V> {
        self.find_handle(key).map(|h| self.slots[h].payload)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_handle(key).is_some()
    }

    /// Upsert. An existing key's payload is overwritten in place with no
    /// resize check; a new key goes through the growth check first and is
    /// stored with an owned copy of `key`.
    pub fn update(&mut self, key: &str, payload: V) -> Result<(), TableError> {
        if let Some(h) = self.find_handle(key) {
            self.slots[h].payload = payload;
            return Ok(());
        }
        self.grow_if_needed()?;
        let handle = self.slots.insert(Entry {
            key: key.into(),
            payload,
            links: Links::default(),
        });
        self.link(handle);
        Ok(())
    }

    /// Overwrite the payload of an existing key; `KeyNotFound` if absent.
    /// Never creates an entry.
    pub fn update_only(&mut self, key: &str, payload: V) -> Result<(), TableError> {
        match self.find_handle(key) {
            Some(h) => {
                self.slots[h].payload = payload;
                Ok(())
            }
            None => Err(TableError::KeyNotFound),
        }
    }

    /// Thread `handle` into the bucket its key hashes to under the current
    /// modulus. Shared by fresh inserts and the rehash pass.
    fn link(&mut self, handle: DefaultKey) {
        let idx = self.bucket_index(&self.slots[handle].key);
        let chain = self.buckets[idx].get_or_insert_with(Chain::new);
        chain.push_front(&mut self.slots, handle);
    }

    /// Growth check for admitting one new key. Triggers when the key set
    /// would reach the bucket capacity; doubles (capped at `max_capacity`)
    /// and rehashes every entry against the new modulus in one pass. The
    /// insert that trips this pays the full O(n) cost.
    fn grow_if_needed(&mut self) -> Result<(), TableError> {
        if self.slots.len() + 1 < self.bucket_capacity {
            return Ok(());
        }
        if self.bucket_capacity >= self.max_capacity {
            return Err(TableError::CapacityExhausted);
        }

        let new_capacity = (self.bucket_capacity * 2).min(self.max_capacity);
        let mut old_buckets = Vec::new();
        old_buckets.resize_with(buckets_for(new_capacity), || None);
        std::mem::swap(&mut self.buckets, &mut old_buckets);
        self.bucket_capacity = new_capacity;

        // Entries stay in the arena; only the chains are rebuilt. Bucket
        // indices are not stable across this pass.
        for mut chain in old_buckets.into_iter().flatten() {
            let mut cursor = chain.cursor();
            while let Some(handle) = cursor.next(&self.slots) {
                chain.remove(&mut self.slots, handle);
                self.link(handle);
            }
            debug_assert!(chain.is_empty());
        }
        Ok(())
    }
}

impl<V: Copy> fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("len", &self.len())
            .field("capacity", &self.bucket_capacity)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the default hash is FNV-1a with the standard 32-bit
    /// constants, bit-exact against published vectors.
    #[test]
    fn fnv1a_reference_vectors() {
        assert_eq!(fnv1a(""), 0x811c_9dc5);
        assert_eq!(fnv1a("a"), 0xe40c_292c);
        assert_eq!(fnv1a("foobar"), 0xbf9c_f968);
    }

    /// Invariant: capacity reconciliation follows the documented branch
    /// table for every set/unset combination.
    #[test]
    fn reconcile_branches() {
        // neither set: both defaults
        let t: Table<u64> = Table::new(TableOptions::new()).unwrap();
        assert_eq!(t.capacity(), DEFAULT_SIZE);
        assert_eq!(t.max_capacity(), DEFAULT_MAX);

        // size only, below the default max: max stays at the default
        let t: Table<u64> = Table::new(TableOptions::new().size(16)).unwrap();
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.max_capacity(), DEFAULT_MAX);

        // size only, above the default max: max follows size
        let t: Table<u64> = Table::new(TableOptions::new().size(100_000)).unwrap();
        assert_eq!(t.capacity(), 100_000);
        assert_eq!(t.max_capacity(), 100_000);

        // max only, below the default size: size shrinks to max
        let t: Table<u64> = Table::new(TableOptions::new().max_size(10)).unwrap();
        assert_eq!(t.capacity(), 10);
        assert_eq!(t.max_capacity(), 10);

        // max only, above the default size: size stays at the default
        let t: Table<u64> = Table::new(TableOptions::new().max_size(50_000)).unwrap();
        assert_eq!(t.capacity(), DEFAULT_SIZE);
        assert_eq!(t.max_capacity(), 50_000);

        // both set, consistent
        let t: Table<u64> = Table::new(TableOptions::new().size(50).max_size(100)).unwrap();
        assert_eq!(t.capacity(), 50);
        assert_eq!(t.max_capacity(), 100);

        // both set, contradictory
        let err = Table::<u64>::new(TableOptions::new().size(100).max_size(50)).unwrap_err();
        assert_eq!(
            err,
            TableError::InvalidConfig {
                size: 100,
                max_size: 50
            }
        );

        // zero is treated as unset, matching an absent option
        let t: Table<u64> = Table::new(TableOptions::new().size(0).max_size(0)).unwrap();
        assert_eq!(t.capacity(), DEFAULT_SIZE);
        assert_eq!(t.max_capacity(), DEFAULT_MAX);
    }

    /// Invariant: `max_size` is clamped to the absolute ceiling.
    #[test]
    fn max_size_clamped_to_absolute_ceiling() {
        let t: Table<u64> = Table::new(TableOptions::new().max_size(usize::MAX)).unwrap();
        assert_eq!(t.max_capacity(), ABSOLUTE_MAX);
    }

    /// Invariant: all keys land in one chain under a constant hash and are
    /// still resolved by exact key comparison.
    #[test]
    fn constant_hash_forces_collisions() {
        fn collide(_: &str) -> u32 {
            0
        }

        let mut t: Table<u64> =
            Table::new(TableOptions::new().size(64).with_hash(collide)).unwrap();
        for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            t.update(k, i as u64).unwrap();
        }
        assert_eq!(t.len(), 5);
        for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert_eq!(t.search(k), Some(i as u64));
        }
        assert_eq!(t.search("f"), None);

        // overwrite resolves to the right colliding entry
        t.update("c", 99).unwrap();
        assert_eq!(t.search("c"), Some(99));
        assert_eq!(t.search("b"), Some(1));
        assert_eq!(t.len(), 5);
    }

    /// Invariant: a custom hash is used for placement; search and update
    /// agree on it.
    #[test]
    fn custom_hash_is_used_consistently() {
        fn len_hash(key: &str) -> u32 {
            key.len() as u32
        }

        let mut t: Table<i32> =
            Table::new(TableOptions::new().size(8).with_hash(len_hash)).unwrap();
        t.update("ab", 1).unwrap();
        t.update("cd", 2).unwrap(); // same length, same bucket
        t.update("xyz", 3).unwrap();
        assert_eq!(t.search("ab"), Some(1));
        assert_eq!(t.search("cd"), Some(2));
        assert_eq!(t.search("xyz"), Some(3));
    }

    /// Invariant: the growth check trips at `len + 1 >= capacity`, doubles
    /// capacity, and a rehash preserves every entry.
    #[test]
    fn growth_doubles_and_preserves_entries() {
        let mut t: Table<u64> = Table::new(TableOptions::new().size(4)).unwrap();
        assert_eq!(t.capacity(), 4);

        t.update("a", 1).unwrap();
        t.update("b", 2).unwrap();
        t.update("c", 3).unwrap();
        assert_eq!(t.capacity(), 4);

        // admitting the 4th key requires len + 1 < capacity, so this one
        // trips the resize
        t.update("d", 4).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.len(), 4);
        for (k, v) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            assert_eq!(t.search(k), Some(v));
        }
    }

    /// Invariant: growth is capped at `max_capacity`; a doubling that
    /// would overshoot lands exactly on the cap.
    #[test]
    fn growth_lands_on_max_capacity() {
        let mut t: Table<u64> = Table::new(TableOptions::new().size(4).max_size(6)).unwrap();
        t.update("a", 1).unwrap();
        t.update("b", 2).unwrap();
        t.update("c", 3).unwrap();
        t.update("d", 4).unwrap();
        assert_eq!(t.capacity(), 6);
        assert_eq!(t.max_capacity(), 6);
    }

    /// Invariant: at max capacity, new distinct keys fail with
    /// `CapacityExhausted` while lookups and existing-key updates keep
    /// working.
    #[test]
    fn capacity_exhausted_leaves_table_usable() {
        let mut t: Table<u64> = Table::new(TableOptions::new().size(2).max_size(2)).unwrap();
        t.update("a", 1).unwrap();
        assert_eq!(t.update("b", 2), Err(TableError::CapacityExhausted));
        assert_eq!(t.len(), 1);
        assert_eq!(t.search("b"), None);

        t.update("a", 10).unwrap();
        assert_eq!(t.search("a"), Some(10));
        t.update_only("a", 11).unwrap();
        assert_eq!(t.search("a"), Some(11));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `update_only` never creates an entry.
    #[test]
    fn update_only_misses_do_not_insert() {
        let mut t: Table<i32> = Table::new(TableOptions::new().size(8)).unwrap();
        assert_eq!(t.update_only("ghost", 1), Err(TableError::KeyNotFound));
        assert_eq!(t.len(), 0);
        assert!(!t.contains_key("ghost"));

        t.update("real", 5).unwrap();
        t.update_only("real", 6).unwrap();
        assert_eq!(t.search("real"), Some(6));
        assert_eq!(t.len(), 1);
    }
}
