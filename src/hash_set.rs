//! HashSet: unique keys in separately chained buckets.

use crate::chain::Chains;
use crate::error::{HandleError, TryReserveError};
use crate::handle::{Handle, SetId};
use crate::iter::Iter;
use crate::key_equal::{DefaultKeyEqual, KeyEqual};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Bucket count used when none (or zero) is requested.
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Load factor ceiling of a freshly constructed set.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// A set of unique keys stored in separately chained buckets.
///
/// `S` computes the digest of a key and `E` decides key equality; the two
/// must agree. New entries are prepended to their chain. The bucket array
/// only grows: automatically (doubling) when an insert finds the load
/// factor above the ceiling, or on request via [`rehash`](Self::rehash)
/// and [`reserve`](Self::reserve).
pub struct HashSet<K, S = DefaultHashBuilder, E = DefaultKeyEqual> {
    chains: Chains<K>,
    max_load_factor: f32,
    hasher: S,
    key_eq: E,
    id: SetId,
}

fn normalize_bucket_count(count: usize) -> usize {
    if count == 0 {
        DEFAULT_BUCKET_COUNT
    } else {
        count
    }
}

impl<K> HashSet<K> {
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    /// A set with `count` buckets; zero means the default of 16.
    pub fn with_bucket_count(count: usize) -> Self {
        Self::with_bucket_count_and_hasher(count, DefaultHashBuilder::default())
    }
}

impl<K, S> HashSet<K, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_bucket_count_and_hasher(DEFAULT_BUCKET_COUNT, hasher)
    }

    pub fn with_bucket_count_and_hasher(count: usize, hasher: S) -> Self {
        Self::with_bucket_count_hasher_and_key_eq(count, hasher, DefaultKeyEqual)
    }
}

impl<K, S, E> HashSet<K, S, E> {
    pub fn with_bucket_count_hasher_and_key_eq(count: usize, hasher: S, key_eq: E) -> Self {
        match Self::try_with_bucket_count_hasher_and_key_eq(count, hasher, key_eq) {
            Ok(set) => set,
            Err(e) => e.raise(),
        }
    }

    pub fn try_with_bucket_count_hasher_and_key_eq(
        count: usize,
        hasher: S,
        key_eq: E,
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            chains: Chains::try_with_buckets(normalize_bucket_count(count))?,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hasher,
            key_eq,
            id: SetId::next(),
        })
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.bucket_count()
    }

    /// Number of entries chained in bucket `n`.
    ///
    /// # Panics
    /// If `n >= bucket_count()`.
    pub fn bucket_size(&self, n: usize) -> usize {
        self.chains.chain_len(n)
    }

    pub fn load_factor(&self) -> f32 {
        self.chains.len() as f32 / self.chains.bucket_count() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    /// Borrow the key a handle designates.
    pub fn get(&self, handle: Handle) -> Result<&K, HandleError> {
        self.check_owner(handle)?;
        self.chains
            .entry(handle.raw_slot())
            .map(|e| &e.key)
            .ok_or(HandleError::Stale)
    }

    /// Handle to the first entry in traversal order, or `None` when empty.
    pub fn first_handle(&self) -> Option<Handle> {
        self.chains.first_from(0).map(|slot| self.handle(slot))
    }

    /// Handle to the entry after `handle` in traversal order; `Ok(None)` at
    /// the end of the set.
    pub fn next_handle(&self, handle: Handle) -> Result<Option<Handle>, HandleError> {
        self.check_owner(handle)?;
        let slot = handle.raw_slot();
        if self.chains.entry(slot).is_none() {
            return Err(HandleError::Stale);
        }
        Ok(self.chains.successor(slot).map(|s| self.handle(s)))
    }

    /// Remove the entry `handle` designates and return a handle to the entry
    /// that followed it, so a traversal can continue past the erased entry.
    pub fn erase_at(&mut self, handle: Handle) -> Result<Option<Handle>, HandleError> {
        self.check_owner(handle)?;
        let (_key, next) = self
            .chains
            .unlink(handle.raw_slot())
            .ok_or(HandleError::Stale)?;
        Ok(next.map(|s| self.handle(s)))
    }

    /// Keep only the keys for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut cur = self.chains.first_from(0);
        while let Some(slot) = cur {
            let retained = match self.chains.entry(slot) {
                Some(e) => keep(&e.key),
                None => break,
            };
            cur = if retained {
                self.chains.successor(slot)
            } else {
                self.chains.unlink(slot).and_then(|(_key, next)| next)
            };
        }
    }

    /// Drop every entry. The bucket count is unchanged and all outstanding
    /// handles become stale.
    pub fn clear(&mut self) {
        self.chains.clear();
    }

    /// Grow the bucket array to `count` buckets. Never shrinks: a count not
    /// above the current one is a no-op.
    pub fn rehash(&mut self, count: usize) {
        if let Err(e) = self.try_rehash(count) {
            e.raise();
        }
    }

    pub fn try_rehash(&mut self, count: usize) -> Result<(), TryReserveError> {
        let old = self.chains.bucket_count();
        if count <= old {
            return Ok(());
        }
        self.chains.try_relink(count)?;
        log::debug!(
            "rehashed {} -> {} buckets ({} entries)",
            old,
            count,
            self.chains.len()
        );
        Ok(())
    }

    /// Make room for `n` keys without exceeding the max load factor.
    pub fn reserve(&mut self, n: usize) {
        if let Err(e) = self.try_reserve(n) {
            e.raise();
        }
    }

    pub fn try_reserve(&mut self, n: usize) -> Result<(), TryReserveError> {
        let target = (n as f64 / self.max_load_factor as f64).floor() as usize;
        self.try_rehash(target.saturating_add(1))
    }

    /// Set the load factor ceiling and grow at once if the current load
    /// factor is above it.
    ///
    /// # Note
    /// Growth here is a single doubling, so after a sharp drop in the
    /// ceiling the load factor can still exceed it. Follow with
    /// `reserve(self.len())` when a guaranteed fit is needed.
    ///
    /// # Panics
    /// If `ml` is not a positive finite number.
    pub fn set_max_load_factor(&mut self, ml: f32) {
        assert!(
            ml.is_finite() && ml > 0.0,
            "max load factor must be positive and finite, got {ml}"
        );
        self.max_load_factor = ml;
        if let Err(e) = self.try_grow_if_needed() {
            e.raise();
        }
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.chains)
    }

    fn try_grow_if_needed(&mut self) -> Result<(), TryReserveError> {
        if self.load_factor() > self.max_load_factor {
            let count = self.chains.bucket_count().saturating_mul(2);
            log::trace!(
                "load factor {} above {}; growing to {} buckets",
                self.load_factor(),
                self.max_load_factor,
                count
            );
            self.try_rehash(count)?;
        }
        Ok(())
    }

    #[inline]
    fn handle(&self, slot: slotmap::DefaultKey) -> Handle {
        Handle::new(self.id, slot)
    }

    #[inline]
    fn check_owner(&self, handle: Handle) -> Result<(), HandleError> {
        if handle.owner() == self.id {
            Ok(())
        } else {
            Err(HandleError::WrongSet)
        }
    }

    pub(crate) fn into_chains(self) -> Chains<K> {
        self.chains
    }
}

impl<K, S, E> HashSet<K, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEqual<K>,
{
    /// Build a set from a sequence of keys. The bucket count defaults to the
    /// sequence length; duplicates after the first are dropped.
    pub fn from_values<I>(values: I, bucket_count: Option<usize>, hasher: S, key_eq: E) -> Self
    where
        I: IntoIterator<Item = K>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let count = bucket_count.unwrap_or(values.len());
        let mut set = Self::with_bucket_count_hasher_and_key_eq(count, hasher, key_eq);
        set.extend(values);
        set
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Insert `key` unless an equal key is present. Returns the handle of
    /// the entry now holding the key and whether it was newly inserted.
    pub fn insert(&mut self, key: K) -> (Handle, bool) {
        match self.try_insert(key) {
            Ok(r) => r,
            Err(e) => e.raise(),
        }
    }

    pub fn try_insert(&mut self, key: K) -> Result<(Handle, bool), TryReserveError> {
        let hash = self.make_hash(&key);
        let key_eq = &self.key_eq;
        if let Some(slot) = self.chains.find(hash, |k| key_eq.equal(k, &key)) {
            return Ok((self.handle(slot), false));
        }
        // Growth is decided on pre-insert occupancy; a duplicate never grows.
        self.try_grow_if_needed()?;
        let slot = self.chains.push_front(hash, key);
        Ok((self.handle(slot), true))
    }

    /// Build a key from `args` and insert it. On a duplicate the freshly
    /// built key is dropped.
    pub fn emplace<A>(&mut self, args: A) -> (Handle, bool)
    where
        K: From<A>,
    {
        self.insert(K::from(args))
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        let hash = self.make_hash(q);
        self.chains
            .find(hash, |k| <E as KeyEqual<Q>>::equal(&self.key_eq, k.borrow(), q))
            .map(|slot| self.handle(slot))
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        self.find(q).is_some()
    }

    /// 1 if an equal key is present, else 0.
    pub fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        usize::from(self.contains(q))
    }

    pub fn get_key<Q>(&self, q: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        let h = self.find(q)?;
        self.get(h).ok()
    }

    /// Remove and return the stored key equal to `q`.
    pub fn take<Q>(&mut self, q: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        let slot = self.find(q)?.raw_slot();
        self.chains.unlink(slot).map(|(key, _next)| key)
    }

    /// Remove the key equal to `q`; returns the number removed (0 or 1).
    pub fn erase<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEqual<Q>,
    {
        usize::from(self.take(q).is_some())
    }

    /// Index of the bucket `q` maps to under the current bucket count.
    pub fn bucket<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.chains.bucket_of(self.make_hash(q))
    }
}

impl<K, S: Default, E: Default> Default for HashSet<K, S, E> {
    fn default() -> Self {
        Self::with_bucket_count_hasher_and_key_eq(DEFAULT_BUCKET_COUNT, S::default(), E::default())
    }
}

impl<K, S, E> Clone for HashSet<K, S, E>
where
    K: Clone,
    S: Clone,
    E: Clone,
{
    /// Deep copy into a fresh bucket array of the same size. Chains are
    /// rebuilt by re-inserting, so per-bucket order may differ.
    fn clone(&self) -> Self {
        let mut copy = Self::with_bucket_count_hasher_and_key_eq(
            self.bucket_count(),
            self.hasher.clone(),
            self.key_eq.clone(),
        );
        copy.max_load_factor = self.max_load_factor;
        copy.copy_entries_from(self);
        copy
    }

    /// Releases this set's entries before taking the source's contents.
    /// Handles minted by this set become invalid.
    fn clone_from(&mut self, source: &Self) {
        self.chains.clear();
        self.chains = match Chains::try_with_buckets(source.bucket_count()) {
            Ok(chains) => chains,
            Err(e) => e.raise(),
        };
        self.max_load_factor = source.max_load_factor;
        self.hasher.clone_from(&source.hasher);
        self.key_eq.clone_from(&source.key_eq);
        self.id = SetId::next();
        self.copy_entries_from(source);
    }
}

impl<K: Clone, S, E> HashSet<K, S, E> {
    fn copy_entries_from(&mut self, source: &Self) {
        let mut cur = source.chains.first_from(0);
        while let Some(slot) = cur {
            let Some(e) = source.chains.entry(slot) else {
                break;
            };
            self.chains.push_front(e.hash, e.key.clone());
            cur = source.chains.successor(slot);
        }
    }
}

impl<K, S, E> PartialEq for HashSet<K, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEqual<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, S, E> Eq for HashSet<K, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEqual<K>,
{
}

impl<K: fmt::Debug, S, E> fmt::Debug for HashSet<K, S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S, E> Extend<K> for HashSet<K, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEqual<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, S, E> Extend<&'a K> for HashSet<K, S, E>
where
    K: Hash + Copy + 'a,
    S: BuildHasher,
    E: KeyEqual<K>,
{
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K, S, E> FromIterator<K> for HashSet<K, S, E>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEqual<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_bucket_count_hasher_and_key_eq(
            iter.size_hint().0,
            S::default(),
            E::default(),
        );
        set.extend(iter);
        set
    }
}

impl<K: Hash + Eq, const N: usize> From<[K; N]> for HashSet<K> {
    fn from(values: [K; N]) -> Self {
        Self::from_values(values, None, DefaultHashBuilder::default(), DefaultKeyEqual)
    }
}

#[cfg(test)]
impl<K: Hash, S: BuildHasher, E> HashSet<K, S, E> {
    /// Check every structural invariant by walking the bucket array.
    pub(crate) fn assert_invariants(&self) {
        let mut reachable = 0;
        for b in 0..self.bucket_count() {
            let mut cur = self.chains.head(b);
            while let Some(slot) = cur {
                let e = self.chains.entry(slot).expect("chained slot is live");
                assert_eq!(e.hash, self.hasher.hash_one(&e.key), "stored digest drifted");
                assert_eq!(self.chains.bucket_of(e.hash), b, "entry chained in wrong bucket");
                reachable += 1;
                cur = e.next;
            }
        }
        assert_eq!(reachable, self.len(), "element count disagrees with chains");
        assert!(self.bucket_count() > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::hash::{BuildHasherDefault, Hasher};

    /// Digest equal to the key's integer value.
    #[derive(Default)]
    struct IdentityHasher(u64);
    impl Hasher for IdentityHasher {
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes.iter().rev() {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }
    type Identity = BuildHasherDefault<IdentityHasher>;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // every key collides in bucket 0
    }

    fn keys<K: Clone + Ord, S, E>(s: &HashSet<K, S, E>) -> BTreeSet<K> {
        s.iter().cloned().collect()
    }

    /// Invariant: a zero bucket request is floored to the default.
    #[test]
    fn construction_defaults() {
        let s: HashSet<u32> = HashSet::new();
        assert_eq!(s.bucket_count(), DEFAULT_BUCKET_COUNT);
        assert_eq!(s.max_load_factor(), DEFAULT_MAX_LOAD_FACTOR);
        assert!(s.is_empty());
        assert_eq!(HashSet::<u32>::with_bucket_count(0).bucket_count(), 16);
        assert_eq!(HashSet::<u32>::with_bucket_count(5).bucket_count(), 5);
    }

    /// Invariant: duplicates are rejected without mutation and yield the
    /// existing entry's handle.
    #[test]
    fn duplicate_insert_returns_existing_handle() {
        let mut s: HashSet<String> = HashSet::new();
        let (h1, inserted) = s.insert("dup".to_string());
        assert!(inserted);
        let (h2, inserted) = s.insert("dup".to_string());
        assert!(!inserted);
        assert_eq!(h1, h2);
        assert_eq!(s.len(), 1);
        s.assert_invariants();
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut s: HashSet<String> = HashSet::new();
        s.insert("hello".to_string());
        assert!(s.contains("hello"));
        assert_eq!(s.count("hello"), 1);
        assert_eq!(s.count("world"), 0);
        assert_eq!(s.get_key("hello").map(String::as_str), Some("hello"));
        assert_eq!(s.erase("world"), 0);
        assert_eq!(s.erase("hello"), 1);
        assert!(s.is_empty());
    }

    /// Invariant: within a chain, traversal is newest-first.
    #[test]
    fn chain_traversal_is_newest_first() {
        let mut s: HashSet<&str, ConstBuildHasher> = HashSet::with_hasher(ConstBuildHasher);
        for k in ["a", "b", "c"] {
            s.insert(k);
        }
        let order: Vec<_> = s.iter().copied().collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert_eq!(s.bucket_size(0), 3);
        s.assert_invariants();
    }

    /// Invariant: chains are visited in ascending bucket order.
    #[test]
    fn buckets_visited_in_ascending_order() {
        let mut s: HashSet<u64, Identity> = HashSet::with_hasher(Identity::default());
        for k in [9u64, 3, 15, 0, 7] {
            s.insert(k);
        }
        let order: Vec<_> = s.iter().copied().collect();
        assert_eq!(order, vec![0, 3, 7, 9, 15]);
        assert_eq!(s.bucket(&9), 9);
    }

    /// Invariant: insert grows (doubling) only when the pre-insert load
    /// factor is above the ceiling, so the post-insert load overshoots by at
    /// most one element.
    #[test]
    fn growth_is_checked_before_insert() {
        let mut s: HashSet<u64, Identity> =
            HashSet::with_bucket_count_and_hasher(4, Identity::default());
        for k in 0..5 {
            s.insert(k);
        }
        // 4/4 is not above 1.0, so the fifth insert lands without growth.
        assert_eq!(s.bucket_count(), 4);
        assert_eq!(s.load_factor(), 1.25);
        s.insert(5);
        assert_eq!(s.bucket_count(), 8);
        assert_eq!(s.len(), 6);
        s.assert_invariants();
    }

    /// Invariant: inserting a key that is already present changes nothing,
    /// even while the load factor is above the ceiling.
    #[test]
    fn duplicate_insert_leaves_layout_untouched() {
        let mut s: HashSet<u64, Identity> =
            HashSet::with_bucket_count_and_hasher(4, Identity::default());
        for k in [1, 5, 9, 2, 3] {
            s.insert(k);
        }
        assert_eq!(s.load_factor(), 1.25);
        let order: Vec<u64> = s.iter().copied().collect();
        assert_eq!(order, vec![9, 5, 1, 2, 3]);

        let h = s.find(&5).unwrap();
        assert_eq!(s.insert(5), (h, false));
        assert_eq!(s.bucket_count(), 4);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), order);

        // A new key still sees the overshoot and grows first.
        assert!(s.insert(4).1);
        assert_eq!(s.bucket_count(), 8);
        s.assert_invariants();
    }

    /// Invariant: rehash never shrinks and preserves logical content.
    #[test]
    fn rehash_is_grow_only() {
        let mut s: HashSet<u32> = (0..40).collect();
        let before = keys(&s);
        let order: Vec<u32> = s.iter().copied().collect();
        let count = s.bucket_count();
        s.rehash(count);
        s.rehash(1);
        assert_eq!(s.bucket_count(), count);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), order);
        s.rehash(count * 3 + 1);
        assert_eq!(s.bucket_count(), count * 3 + 1);
        assert_eq!(keys(&s), before);
        for k in 0..40 {
            assert!(s.contains(&k));
        }
        assert!(!s.contains(&40));
        s.assert_invariants();
    }

    /// Invariant: reserve targets floor(n / max_load_factor) + 1 buckets.
    #[test]
    fn reserve_uses_max_load_factor() {
        let mut s: HashSet<u32> = HashSet::new();
        s.reserve(10);
        assert_eq!(s.bucket_count(), 16);
        s.set_max_load_factor(0.5);
        s.reserve(20);
        assert_eq!(s.bucket_count(), 41);
        s.set_max_load_factor(0.25);
        s.reserve(30);
        assert_eq!(s.bucket_count(), 121);
    }

    /// Invariant: lowering the ceiling below the current load grows at once.
    #[test]
    fn lowering_max_load_factor_triggers_growth() {
        let mut s: HashSet<u32> = HashSet::new();
        for k in 0..8 {
            s.insert(k);
        }
        s.set_max_load_factor(0.5);
        assert_eq!(s.bucket_count(), 16);
        s.set_max_load_factor(0.25);
        assert_eq!(s.bucket_count(), 32);
        s.assert_invariants();
    }

    /// Invariant: a lowered ceiling grows by one doubling; reserve closes
    /// the remaining gap.
    #[test]
    fn sharp_max_load_factor_drop_needs_reserve() {
        let mut s: HashSet<u32> = (0..8).collect();
        assert_eq!(s.bucket_count(), 8);
        s.rehash(16);
        s.set_max_load_factor(0.1);
        assert_eq!(s.bucket_count(), 32);
        assert!(s.load_factor() > s.max_load_factor());
        s.reserve(s.len());
        assert!(s.bucket_count() >= 80);
        assert!(s.load_factor() <= s.max_load_factor());
        s.assert_invariants();
    }

    #[test]
    #[should_panic(expected = "max load factor must be positive")]
    fn zero_max_load_factor_panics() {
        let mut s: HashSet<u32> = HashSet::new();
        s.set_max_load_factor(0.0);
    }

    /// Invariant: an impossible bucket array is reported, not attempted, and
    /// leaves the set untouched.
    #[test]
    fn try_reserve_reports_overflow() {
        let mut s: HashSet<u32> = [1, 2, 3].into();
        assert_eq!(s.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(s.try_rehash(usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(s.bucket_count(), 3);
        assert_eq!(s.len(), 3);
        s.assert_invariants();
    }

    /// Invariant: handles survive rehash because entries are relinked in place.
    #[test]
    fn handles_survive_rehash() {
        let mut s: HashSet<u32> = HashSet::new();
        let (h, _) = s.insert(7);
        s.rehash(1000);
        assert_eq!(s.get(h), Ok(&7));
        assert_eq!(s.find(&7), Some(h));
    }

    /// Invariant: erase_at returns the traversal successor, making it usable
    /// to erase while walking the set.
    #[test]
    fn erase_at_walks_the_set() {
        let mut s: HashSet<u64, Identity> = HashSet::with_hasher(Identity::default());
        for k in [1u64, 17, 2, 5] {
            s.insert(k);
        }
        // bucket 1: [17, 1], bucket 2: [2], bucket 5: [5]
        let h17 = s.find(&17).unwrap();
        let next = s.erase_at(h17).unwrap().unwrap();
        assert_eq!(s.get(next), Ok(&1));
        let next = s.erase_at(next).unwrap().unwrap();
        assert_eq!(s.get(next), Ok(&2));
        let h5 = s.find(&5).unwrap();
        assert_eq!(s.erase_at(h5), Ok(None));
        assert_eq!(keys(&s), BTreeSet::from([2]));
        assert_eq!(s.erase_at(h17), Err(HandleError::Stale));
        s.assert_invariants();
    }

    /// Invariant: handles are checked against their originating set.
    #[test]
    fn foreign_handle_is_rejected() {
        let mut a: HashSet<u32> = HashSet::new();
        let mut b: HashSet<u32> = HashSet::new();
        let (ha, _) = a.insert(1);
        b.insert(1);
        assert_eq!(b.get(ha), Err(HandleError::WrongSet));
        assert_eq!(b.erase_at(ha), Err(HandleError::WrongSet));
        assert_eq!(b.next_handle(ha), Err(HandleError::WrongSet));
        assert_eq!(b.len(), 1);
    }

    /// Invariant: clear makes every outstanding handle stale and keeps the
    /// bucket count.
    #[test]
    fn clear_invalidates_handles() {
        let mut s: HashSet<u32> = HashSet::with_bucket_count(64);
        let (h, _) = s.insert(3);
        s.clear();
        assert_eq!(s.get(h), Err(HandleError::Stale));
        assert_eq!(s.bucket_count(), 64);
        let (h2, inserted) = s.insert(3);
        assert!(inserted);
        assert_ne!(h, h2, "stale handle must not alias the new entry");
    }

    /// Invariant: the handle cursor visits exactly what `iter` visits, in the
    /// same order.
    #[test]
    fn handle_cursor_matches_iter() {
        let s: HashSet<u32> = (0..50).collect();
        let mut via_handles = Vec::new();
        let mut cur = s.first_handle();
        while let Some(h) = cur {
            via_handles.push(*h.key(&s).unwrap());
            cur = s.next_handle(h).unwrap();
        }
        let via_iter: Vec<u32> = s.iter().copied().collect();
        assert_eq!(via_handles, via_iter);
    }

    #[test]
    fn retain_keeps_matching_keys() {
        let mut s: HashSet<u32> = (0..100).collect();
        s.retain(|k| k % 3 == 0);
        assert_eq!(s.len(), 34);
        assert!(s.iter().all(|k| k % 3 == 0));
        s.assert_invariants();
    }

    /// Invariant: emplace builds the key first and drops it on a duplicate.
    #[test]
    fn emplace_constructs_then_inserts() {
        thread_local!(static BUILT: Cell<usize> = const { Cell::new(0) });
        #[derive(Hash, PartialEq, Eq, Debug)]
        struct Tracked(u32);
        impl From<u32> for Tracked {
            fn from(v: u32) -> Self {
                BUILT.with(|b| b.set(b.get() + 1));
                Tracked(v)
            }
        }

        let mut s: HashSet<Tracked> = HashSet::new();
        assert!(s.emplace(10u32).1);
        assert!(!s.emplace(10u32).1);
        assert_eq!(BUILT.with(Cell::get), 2);
        assert_eq!(s.len(), 1);
    }

    /// Invariant: a clone keeps bucket count and ceiling but is independent.
    #[test]
    fn clone_is_deep() {
        let mut s: HashSet<u32> = HashSet::with_bucket_count(32);
        s.set_max_load_factor(0.75);
        s.extend(0..10);
        let mut c = s.clone();
        assert_eq!(c.bucket_count(), 32);
        assert_eq!(c.max_load_factor(), 0.75);
        assert_eq!(c, s);
        c.insert(99);
        s.erase(&0);
        assert!(!s.contains(&99));
        assert!(c.contains(&0));
        c.assert_invariants();
    }

    /// Invariant: clone_from replaces contents and invalidates the target's
    /// handles.
    #[test]
    fn clone_from_releases_previous_entries() {
        let mut target: HashSet<u32> = (100..103).collect();
        let (old, _) = target.insert(500);
        let source: HashSet<u32> = HashSet::from_values(
            [1, 2],
            Some(64),
            DefaultHashBuilder::default(),
            DefaultKeyEqual,
        );
        target.clone_from(&source);
        assert_eq!(target, source);
        assert_eq!(target.bucket_count(), 64);
        assert!(target.get(old).is_err());
    }

    #[test]
    fn debug_formats_as_set() {
        let s: HashSet<u32> = [4].into();
        assert_eq!(format!("{s:?}"), "{4}");
    }
}
