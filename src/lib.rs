//! # omtree
//!
//! An in-memory, rank-addressable sequence container for Rust.
//!
//! ## Overview
//!
//! [`OrderMaintenanceTree`] keeps elements in a caller-determined order and
//! addresses them by rank (zero-based position). It includes:
//!
//! - **Rank Access**: `fetch`, `set_at`, `insert_at`, `delete_at` in O(log N)
//! - **Ordered Insertion**: `insert_by` with a caller-supplied comparator
//! - **Heaviside Search**: binary search generalized to three-valued
//!   predicates, see [`heaviside`]
//! - **Structural Operations**: split, merge and three clone strategies
//! - **Iteration**: borrowing and owning iterators, rank ranges, and
//!   aborting callbacks
//!
//! Every allocation is fallible: operations report
//! [`Error::OutOfMemory`] instead of aborting, and leave the tree unchanged
//! when they do.
//!
//! ## Feature Flags
//!
//! - `pool` (default): `clone_pooled` into a `bumpalo::Bump`
//! - `serde`: `Serialize` / `Deserialize` for the tree
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use omtree::prelude::*;
//!
//! let mut tree = OrderMaintenanceTree::from_sorted_slice(&[10, 30]).unwrap();
//! assert_eq!(tree.insert_by(20, |stored| stored.cmp(&20)), Ok(1));
//! assert_eq!(tree.find_zero(heaviside::at_least(25)), Ok((2, &30)));
//!
//! let right = tree.split_at(1).unwrap();
//! let merged = OrderMaintenanceTree::merge(tree, right).unwrap();
//! assert_eq!(merged.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use omtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::heaviside;
    pub use crate::tree::{OrderMaintenanceTree, SearchDirection};
}

pub mod error;
pub mod heaviside;
pub mod tree;

pub use error::{Error, MergeError, OrderMaintenanceTreeError, Result};
pub use tree::{IntoIter, Iter, OrderMaintenanceTree, OwnedPayload, SearchDirection};
