//! Error types for fallible growth and handle resolution.
//!
//! Absence of a key is never an error: lookups report it with `None`,
//! `0` or `false`.

use std::alloc::Layout;
use thiserror::Error;

/// Failure to size or allocate a bucket array.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum TryReserveError {
    /// The requested bucket count does not fit in a valid allocation.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator refused a well-formed request.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// Layout of the bucket array that could not be allocated.
        layout: Layout,
    },
}

impl TryReserveError {
    /// Escalate the way the infallible std collections do.
    pub(crate) fn raise(self) -> ! {
        match self {
            TryReserveError::CapacityOverflow => panic!("capacity overflow"),
            TryReserveError::AllocError { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

/// Precondition failure when resolving a [`Handle`](crate::Handle).
#[derive(Error, Copy, Clone, Debug, Eq, PartialEq)]
pub enum HandleError {
    /// The handle was minted by a different set.
    #[error("handle belongs to a different set")]
    WrongSet,

    /// The entry behind the handle has been erased or cleared.
    #[error("handle refers to an erased entry")]
    Stale,
}
