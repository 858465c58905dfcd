//! Key equality strategies.
//!
//! The digest side of the strategy pair is any `BuildHasher`; this module
//! supplies the other side. Implementations must agree with the hasher:
//! keys that compare equal must produce equal digests.

/// Equality predicate used to resolve keys within a chain.
pub trait KeyEqual<Q: ?Sized> {
    fn equal(&self, a: &Q, b: &Q) -> bool;
}

/// Equality via `Eq`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DefaultKeyEqual;

impl<Q: ?Sized + Eq> KeyEqual<Q> for DefaultKeyEqual {
    #[inline]
    fn equal(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

/// Adapts a closure into a [`KeyEqual`].
///
/// ```
/// use chained_hashset::{EqFn, KeyEqual};
///
/// let eq = EqFn(|a: &i32, b: &i32| a % 10 == b % 10);
/// assert!(eq.equal(&3, &13));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct EqFn<F>(pub F);

impl<Q: ?Sized, F> KeyEqual<Q> for EqFn<F>
where
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn equal(&self, a: &Q, b: &Q) -> bool {
        (self.0)(a, b)
    }
}
