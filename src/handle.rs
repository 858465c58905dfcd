//! Handle: opaque position of one entry, checked against its owning set.

use crate::error::HandleError;
use crate::hash_set::HashSet;
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::DefaultKey;

/// Identity of one set instance. Fresh ids are minted on construction,
/// on clone, and when a set's contents are replaced by `clone_from`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct SetId(u64);

impl SetId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SetId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Non-owning reference to an entry in a [`HashSet`].
///
/// A handle stays valid until its entry is erased or the set is cleared.
/// Rehashing relinks entries without moving them, so growth does not
/// invalidate handles. Resolving a handle against another set, or after
/// its entry is gone, yields a [`HandleError`] instead of aliasing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    owner: SetId,
    slot: DefaultKey,
}

impl Handle {
    pub(crate) fn new(owner: SetId, slot: DefaultKey) -> Self {
        Handle { owner, slot }
    }

    pub(crate) fn owner(&self) -> SetId {
        self.owner
    }

    pub(crate) fn raw_slot(&self) -> DefaultKey {
        self.slot
    }

    /// Borrow the key this handle designates.
    pub fn key<'a, K, S, E>(&self, set: &'a HashSet<K, S, E>) -> Result<&'a K, HandleError> {
        set.get(*self)
    }
}
