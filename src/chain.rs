//! Bucket array and entry storage.
//!
//! Entries live in a generational arena; each bucket holds the arena key of
//! its chain head and each entry holds the key of its successor. Unlinking
//! frees the arena slot, so a stale key can never resolve to a newer entry.

use crate::error::TryReserveError;
use core::alloc::Layout;
use slotmap::{DefaultKey, SlotMap};

type Link = Option<DefaultKey>;

#[derive(Debug)]
pub(crate) struct Entry<K> {
    pub(crate) key: K,
    pub(crate) hash: u64,
    pub(crate) next: Link,
}

#[derive(Debug)]
pub(crate) struct Chains<K> {
    heads: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K>>,
}

fn try_alloc_heads(count: usize) -> Result<Vec<Link>, TryReserveError> {
    let layout = Layout::array::<Link>(count).map_err(|_| TryReserveError::CapacityOverflow)?;
    let mut heads = Vec::new();
    heads
        .try_reserve_exact(count)
        .map_err(|_| TryReserveError::AllocError { layout })?;
    heads.resize(count, None);
    Ok(heads)
}

impl<K> Chains<K> {
    /// `count` must be non-zero.
    pub(crate) fn try_with_buckets(count: usize) -> Result<Self, TryReserveError> {
        debug_assert!(count > 0);
        Ok(Self {
            heads: try_alloc_heads(count)?,
            slots: SlotMap::with_key(),
        })
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn head(&self, bucket: usize) -> Link {
        self.heads[bucket]
    }

    #[inline]
    pub(crate) fn entry(&self, slot: DefaultKey) -> Option<&Entry<K>> {
        self.slots.get(slot)
    }

    /// Walk the chain for `hash` and return the first entry accepted by `hit`.
    pub(crate) fn find<F>(&self, hash: u64, mut hit: F) -> Link
    where
        F: FnMut(&K) -> bool,
    {
        let mut cur = self.heads[self.bucket_of(hash)];
        while let Some(slot) = cur {
            let e = &self.slots[slot];
            if hit(&e.key) {
                return Some(slot);
            }
            cur = e.next;
        }
        None
    }

    /// Number of entries chained at `bucket`.
    pub(crate) fn chain_len(&self, bucket: usize) -> usize {
        let mut n = 0;
        let mut cur = self.heads[bucket];
        while let Some(slot) = cur {
            n += 1;
            cur = self.slots[slot].next;
        }
        n
    }

    /// Prepend a new entry to its bucket. The caller guarantees uniqueness.
    pub(crate) fn push_front(&mut self, hash: u64, key: K) -> DefaultKey {
        let bucket = self.bucket_of(hash);
        let next = self.heads[bucket];
        let slot = self.slots.insert(Entry { key, hash, next });
        self.heads[bucket] = Some(slot);
        slot
    }

    /// Unlink and free `slot`, returning its key and the entry that followed
    /// it in traversal order.
    pub(crate) fn unlink(&mut self, slot: DefaultKey) -> Option<(K, Link)> {
        let (hash, next) = {
            let e = self.slots.get(slot)?;
            (e.hash, e.next)
        };
        let bucket = self.bucket_of(hash);

        if self.heads[bucket] == Some(slot) {
            self.heads[bucket] = next;
        } else {
            let mut prev = self.heads[bucket]?;
            loop {
                let after = self.slots[prev].next?;
                if after == slot {
                    self.slots[prev].next = next;
                    break;
                }
                prev = after;
            }
        }

        let entry = self.slots.remove(slot)?;
        let successor = match next {
            Some(n) => Some(n),
            None => self.first_from(bucket + 1),
        };
        Some((entry.key, successor))
    }

    /// Head of the first non-empty bucket at or after `bucket`.
    pub(crate) fn first_from(&self, bucket: usize) -> Link {
        self.heads
            .get(bucket..)
            .and_then(|rest| rest.iter().find_map(|&h| h))
    }

    /// Traversal successor of a live entry.
    pub(crate) fn successor(&self, slot: DefaultKey) -> Link {
        let e = &self.slots[slot];
        match e.next {
            Some(n) => Some(n),
            None => self.first_from(self.bucket_of(e.hash) + 1),
        }
    }

    /// Drop every entry; the bucket array keeps its size.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.heads.fill(None);
    }

    /// Replace the bucket array with one of `count` buckets and relink every
    /// entry by its stored digest. Entries stay in their arena slots.
    pub(crate) fn try_relink(&mut self, count: usize) -> Result<(), TryReserveError> {
        let mut heads = try_alloc_heads(count)?;
        for b in 0..self.heads.len() {
            let mut cur = self.heads[b];
            while let Some(slot) = cur {
                let e = &mut self.slots[slot];
                cur = e.next;
                let target = (e.hash % count as u64) as usize;
                e.next = heads[target];
                heads[target] = Some(slot);
            }
        }
        self.heads = heads;
        Ok(())
    }

    /// Consume the storage, yielding the arena and the bucket array.
    pub(crate) fn into_parts(self) -> (Vec<Link>, SlotMap<DefaultKey, Entry<K>>) {
        (self.heads, self.slots)
    }
}
