//! Error type shared by every fallible tree operation.
//!
//! All failures are reported as values; no operation panics on a caller
//! error and no operation leaves the tree half-modified.
//!
//! # Examples
//!
//! ```rust
//! use omtree::{Error, OrderMaintenanceTree};
//!
//! let tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30]).unwrap();
//! assert_eq!(
//!     tree.fetch(3),
//!     Err(Error::InvalidArgument { rank: 3, limit: 3 })
//! );
//! ```

use std::fmt;

use thiserror::Error;

use crate::tree::OrderMaintenanceTree;

/// Failure of an [`OrderMaintenanceTree`](crate::OrderMaintenanceTree) operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// A rank fell outside the range accepted by the operation.
    ///
    /// `limit` is the exclusive upper bound that was violated: the tree
    /// length for `fetch`, `set_at` and `delete_at`, and the length plus one
    /// for `insert_at` and `split_at`.
    #[error("rank {rank} is out of range (must be below {limit})")]
    InvalidArgument {
        /// The rejected rank.
        rank: usize,
        /// The exclusive bound the rank had to stay below.
        limit: usize,
    },

    /// An element comparing equal to the inserted value is already stored.
    #[error("an equal element is already stored at rank {rank}")]
    DuplicateKey {
        /// Rank of the element that compared equal.
        rank: usize,
    },

    /// No element lies in the sign region targeted by a heaviside search.
    ///
    /// A zero search still reports the rank where a zero run would begin.
    #[error("no element matches the heaviside predicate")]
    NotFound {
        /// First rank whose sign is not negative; only set by `find_zero`.
        boundary: Option<usize>,
    },

    /// Reserving storage for `requested` additional elements failed.
    ///
    /// Covers node storage and the payload copies made by the deep clones.
    #[error("failed to reserve storage for {requested} elements")]
    OutOfMemory {
        /// Number of elements the failed reservation asked for.
        requested: usize,
    },
}

/// Alias that reads better at call sites outside the crate.
pub type OrderMaintenanceTreeError = Error;

/// Result type returned by fallible tree operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the zero-run boundary carried by a failed `find_zero`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::Error;
    ///
    /// assert_eq!(Error::NotFound { boundary: Some(4) }.boundary(), Some(4));
    /// assert_eq!(Error::DuplicateKey { rank: 1 }.boundary(), None);
    /// ```
    #[must_use]
    pub const fn boundary(&self) -> Option<usize> {
        match self {
            Self::NotFound { boundary } => *boundary,
            _ => None,
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`Error::OutOfMemory`].
    #[must_use]
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    pub(crate) fn out_of_memory(requested: usize) -> Self {
        tracing::warn!(requested, "storage reservation failed");
        Self::OutOfMemory { requested }
    }

    pub(crate) const fn check_rank(rank: usize, limit: usize) -> Result<()> {
        if rank < limit {
            Ok(())
        } else {
            Err(Self::InvalidArgument { rank, limit })
        }
    }
}

// =============================================================================
// Merge Failure
// =============================================================================

/// Failure of [`OrderMaintenanceTree::merge`], carrying both inputs back.
///
/// A failed merge leaves its inputs untouched, so nothing is lost when
/// memory runs out.
///
/// # Examples
///
/// ```rust
/// use omtree::OrderMaintenanceTree;
///
/// fn merge_or_keep(
///     left: OrderMaintenanceTree<i32>,
///     right: OrderMaintenanceTree<i32>,
/// ) -> (OrderMaintenanceTree<i32>, Option<OrderMaintenanceTree<i32>>) {
///     match OrderMaintenanceTree::merge(left, right) {
///         Ok(merged) => (merged, None),
///         Err(failure) => {
///             let (left, right) = failure.into_inputs();
///             (left, Some(right))
///         }
///     }
/// }
///
/// let left = OrderMaintenanceTree::from_sorted_slice(&[1]).unwrap();
/// let right = OrderMaintenanceTree::from_sorted_slice(&[2]).unwrap();
/// let (merged, rest) = merge_or_keep(left, right);
/// assert_eq!(merged.len(), 2);
/// assert!(rest.is_none());
/// ```
pub struct MergeError<V> {
    error: Error,
    left: OrderMaintenanceTree<V>,
    right: OrderMaintenanceTree<V>,
}

impl<V> MergeError<V> {
    pub(crate) const fn new(
        error: Error,
        left: OrderMaintenanceTree<V>,
        right: OrderMaintenanceTree<V>,
    ) -> Self {
        Self { error, left, right }
    }

    /// Returns the failure that stopped the merge.
    #[must_use]
    pub const fn error(&self) -> Error {
        self.error
    }

    /// Returns the two trees passed to `merge`, unchanged.
    #[must_use]
    pub fn into_inputs(self) -> (OrderMaintenanceTree<V>, OrderMaintenanceTree<V>) {
        (self.left, self.right)
    }
}

impl<V> fmt::Debug for MergeError<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MergeError")
            .field("error", &self.error)
            .field("left_len", &self.left.len())
            .field("right_len", &self.right.len())
            .finish()
    }
}

impl<V> fmt::Display for MergeError<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "merge failed: {}", self.error)
    }
}

impl<V> std::error::Error for MergeError<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<V> From<MergeError<V>> for Error {
    fn from(failure: MergeError<V>) -> Self {
        failure.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::InvalidArgument { rank: 4, limit: 4 }, "rank 4 is out of range (must be below 4)")]
    #[case(Error::DuplicateKey { rank: 1 }, "an equal element is already stored at rank 1")]
    #[case(Error::NotFound { boundary: Some(0) }, "no element matches the heaviside predicate")]
    #[case(Error::OutOfMemory { requested: 8 }, "failed to reserve storage for 8 elements")]
    fn test_error_display(#[case] error: Error, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn test_error_implements_std_error() {
        let error = Error::NotFound { boundary: None };
        let _: &dyn std::error::Error = &error;
    }

    #[rstest]
    fn test_boundary_only_on_not_found() {
        assert_eq!(Error::NotFound { boundary: Some(7) }.boundary(), Some(7));
        assert_eq!(Error::NotFound { boundary: None }.boundary(), None);
        assert_eq!(Error::OutOfMemory { requested: 1 }.boundary(), None);
    }

    #[rstest]
    #[case(0, 1, true)]
    #[case(1, 1, false)]
    #[case(0, 0, false)]
    fn test_check_rank(#[case] rank: usize, #[case] limit: usize, #[case] accepted: bool) {
        assert_eq!(Error::check_rank(rank, limit).is_ok(), accepted);
    }

    #[rstest]
    fn test_predicates() {
        assert!(Error::NotFound { boundary: None }.is_not_found());
        assert!(!Error::DuplicateKey { rank: 0 }.is_not_found());
        assert!(Error::OutOfMemory { requested: 2 }.is_out_of_memory());
    }

    #[rstest]
    fn test_merge_error_reports_cause_and_returns_inputs() {
        let left = OrderMaintenanceTree::from_sorted_slice(&[1, 2]).unwrap();
        let right = OrderMaintenanceTree::from_sorted_slice(&[3]).unwrap();
        let failure = MergeError::new(Error::OutOfMemory { requested: 3 }, left, right);

        assert_eq!(failure.error(), Error::OutOfMemory { requested: 3 });
        assert_eq!(
            failure.to_string(),
            "merge failed: failed to reserve storage for 3 elements"
        );
        assert!(std::error::Error::source(&failure).is_some());
        assert_eq!(
            format!("{failure:?}"),
            "MergeError { error: OutOfMemory { requested: 3 }, left_len: 2, right_len: 1 }"
        );

        let (left, right) = failure.into_inputs();
        assert_eq!(left.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(right.iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[rstest]
    fn test_merge_error_converts_into_error() {
        let failure = MergeError::new(
            Error::OutOfMemory { requested: 1 },
            OrderMaintenanceTree::<u8>::new(),
            OrderMaintenanceTree::new(),
        );
        assert_eq!(Error::from(failure), Error::OutOfMemory { requested: 1 });
    }
}
