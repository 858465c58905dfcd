//! Forward iteration over a [`HashSet`].
//!
//! Both iterators walk the bucket array in ascending index order and each
//! chain from its head, so within a bucket the most recently inserted key
//! comes first. Any structural change to the set requires a new iterator;
//! the borrow checker enforces this for [`Iter`]. To erase while walking,
//! use the handle cursor (`first_handle`, `next_handle`, `erase_at`).

use crate::chain::{Chains, Entry};
use crate::hash_set::HashSet;
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SlotMap};

/// Borrowing iterator over the keys of a [`HashSet`].
pub struct Iter<'a, K> {
    chains: &'a Chains<K>,
    bucket: usize,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(chains: &'a Chains<K>) -> Self {
        Iter {
            chains,
            bucket: 0,
            cur: None,
            remaining: chains.len(),
        }
    }
}

impl<'a, K> Clone for Iter<'a, K> {
    fn clone(&self) -> Self {
        Iter {
            chains: self.chains,
            bucket: self.bucket,
            cur: self.cur,
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.cur {
                let e = self.chains.entry(slot)?;
                self.cur = e.next;
                self.remaining -= 1;
                return Some(&e.key);
            }
            if self.bucket >= self.chains.bucket_count() {
                return None;
            }
            self.cur = self.chains.head(self.bucket);
            self.bucket += 1;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

/// Owning iterator; frees each entry as it is yielded.
pub struct IntoIter<K> {
    heads: std::vec::IntoIter<Option<DefaultKey>>,
    slots: SlotMap<DefaultKey, Entry<K>>,
    cur: Option<DefaultKey>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        loop {
            if let Some(slot) = self.cur {
                let e = self.slots.remove(slot)?;
                self.cur = e.next;
                return Some(e.key);
            }
            self.cur = self.heads.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}
impl<K> FusedIterator for IntoIter<K> {}

impl<'a, K, S, E> IntoIterator for &'a HashSet<K, S, E> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S, E> IntoIterator for HashSet<K, S, E> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        let (heads, slots) = self.into_chains().into_parts();
        IntoIter {
            heads: heads.into_iter(),
            slots,
            cur: None,
        }
    }
}
