//! chained-hashset: an unordered set of unique keys using separate
//! chaining, with stable, generation-checked handles to its entries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hash set whose collision resolution, growth policy and
//!   traversal order are explicit and predictable, built from safe Rust.
//! - Layers:
//!   - `Chains<K>`: the bucket array (one optional chain head per bucket)
//!     over a generational arena of entries. Owns entry lifecycle:
//!     prepend, unlink-with-successor, clear, relink into a larger array.
//!   - `HashSet<K, S, E>`: public API. Computes digests with `S`, resolves
//!     keys within a chain with `E`, and decides when to grow.
//!   - `Handle`: opaque cursor naming one entry, checked against the
//!     owning set on every use.
//!
//! Constraints
//! - Unique keys under `E`; inserting a present key is a no-op.
//! - New entries are prepended to their chain. Traversal visits buckets in
//!   ascending index order and each chain head-first.
//! - The bucket count is never zero and never decreases. Insert grows by
//!   doubling when the pre-insert load factor exceeds the ceiling.
//! - Single-threaded by construction: `&mut self` for every mutation; no
//!   interior mutability, no locking. The set is `Send`, so callers that
//!   need sharing can wrap it in a lock.
//!
//! Digest invariants
//! - Each entry stores the `u64` digest computed at insertion. Growth
//!   re-buckets with the stored digest and never calls back into `S`.
//! - Bucket index is `digest % bucket_count`.
//!
//! Handles
//! - A handle is (owner id, arena key). The arena key carries a generation,
//!   so a handle to an erased entry never resolves to a newer one, and the
//!   owner id rejects handles minted by another set.
//! - Growth relinks entries without moving them, so handles survive it.
//!   Erase of that entry, `clear` and `clone_from` invalidate them.
//!
//! Failure
//! - Absence is reported with `None`/`0`/`false`, never an error.
//! - Bucket-array allocation failure surfaces from the `try_*` methods as
//!   [`TryReserveError`]; the infallible forms panic on capacity overflow
//!   or call `handle_alloc_error`, like the std collections.
//!
//! Notes and non-goals
//! - No open addressing, no shrinking, no ordering guarantees.
//! - Keys are immutable once inserted; there is no `iter_mut`.
//! - Moving out with `std::mem::take` leaves a usable default set.

mod chain;
pub mod error;
mod handle;
mod hash_set;
mod hash_set_proptest;
pub mod iter;
mod key_equal;

// Public surface
pub use error::{HandleError, TryReserveError};
pub use handle::Handle;
pub use hash_set::{HashSet, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_LOAD_FACTOR};
pub use iter::{IntoIter, Iter};
pub use key_equal::{DefaultKeyEqual, EqFn, KeyEqual};
pub use hashbrown::hash_map::DefaultHashBuilder;
