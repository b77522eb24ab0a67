//! Heap-owned payload copies made by `clone_individual`.

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::node::check_failpoint;
use crate::error::{Error, Result};

/// A single value in its own heap allocation.
///
/// Behaves like `Box<T>`, but the allocation is fallible: running out of
/// memory is reported as [`Error::OutOfMemory`] instead of aborting.
///
/// # Examples
///
/// ```rust
/// use omtree::OwnedPayload;
///
/// let payload = OwnedPayload::try_new(String::from("text")).unwrap();
/// assert_eq!(payload.len(), 4);
/// assert_eq!(payload.into_inner(), "text");
/// ```
pub struct OwnedPayload<T>(Box<[T]>);

impl<T> OwnedPayload<T> {
    /// Moves `value` into a fresh heap allocation.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the allocation fails; `value` is dropped.
    pub fn try_new(value: T) -> Result<Self> {
        check_failpoint(1)?;
        let mut slot = Vec::new();
        slot.try_reserve_exact(1).map_err(|_| Error::out_of_memory(1))?;
        slot.push(value);
        Ok(Self(slot.into_boxed_slice()))
    }

    /// Moves the value back out of its allocation.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self.0.into_vec().pop() {
            Some(value) => value,
            None => unreachable!("an owned payload holds exactly one value"),
        }
    }
}

impl<T> Deref for OwnedPayload<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match &*self.0 {
            [value] => value,
            _ => unreachable!("an owned payload holds exactly one value"),
        }
    }
}

impl<T> DerefMut for OwnedPayload<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match &mut *self.0 {
            [value] => value,
            _ => unreachable!("an owned payload holds exactly one value"),
        }
    }
}

impl<T> AsRef<T> for OwnedPayload<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: PartialEq> PartialEq for OwnedPayload<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq> Eq for OwnedPayload<T> {}

impl<T: fmt::Debug> fmt::Debug for OwnedPayload<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, formatter)
    }
}
