//! Rank-addressable order-maintenance tree.
//!
//! This module provides [`OrderMaintenanceTree`], a mutable sequence that can
//! be addressed both by position ("rank") and by value order through
//! caller-supplied comparators.
//!
//! # Overview
//!
//! `OrderMaintenanceTree` is a height-balanced (AVL) binary tree whose nodes
//! carry subtree weights. It provides:
//!
//! - O(log N) `fetch`, `set_at`, `insert_at` and `delete_at` in the worst case
//! - O(log N) comparator-driven insertion and heaviside search
//! - O(N) bulk construction, split, merge and clone
//!
//! The tree never inspects its elements. Ordering comes from rank alone, or
//! from the caller's comparator, which must agree with rank order.
//!
//! # Allocation Failure
//!
//! Nodes live in an arena that grows through `try_reserve`. Every operation
//! reserves what it needs before changing anything, so an
//! [`Error::OutOfMemory`] leaves the tree exactly as it was.
//!
//! # Examples
//!
//! ```rust
//! use omtree::OrderMaintenanceTree;
//!
//! let mut tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30]).unwrap();
//! assert_eq!(tree.fetch(1), Ok(&20));
//!
//! tree.insert_at(15, 1).unwrap();
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![10, 15, 20, 30]);
//!
//! let right = tree.split_at(2).unwrap();
//! assert_eq!(tree.len(), 2);
//! assert_eq!(right.fetch(0), Ok(&20));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

mod iter;
mod node;
mod payload;
mod search;
mod structural;

pub use iter::{IntoIter, Iter};
pub use payload::OwnedPayload;
pub use search::SearchDirection;

use node::{Link, NodeArena};

// =============================================================================
// OrderMaintenanceTree Definition
// =============================================================================

/// A mutable sequence with O(log N) rank addressing.
///
/// # Time Complexity
///
/// | Operation           | Complexity |
/// |---------------------|------------|
/// | `new`               | O(1)       |
/// | `from_sorted_slice` | O(N)       |
/// | `from_sorted_vec`   | O(N)       |
/// | `fetch`             | O(log N)   |
/// | `set_at`            | O(log N)   |
/// | `insert_at`         | O(log N)   |
/// | `delete_at`         | O(log N)   |
/// | `insert_by`         | O(log N)   |
/// | `find_*`            | O(log N)   |
/// | `split_at`          | O(N)       |
/// | `merge` / `append`  | O(N + M)   |
/// | `clone_*`           | O(N)       |
/// | `len`               | O(1)       |
///
/// # Examples
///
/// ```rust
/// use omtree::{Error, OrderMaintenanceTree};
///
/// let mut tree = OrderMaintenanceTree::from_sorted_slice(&[10, 30]).unwrap();
/// assert_eq!(tree.insert_by(20, |stored| stored.cmp(&20)), Ok(1));
/// assert_eq!(
///     tree.insert_by(20, |stored| stored.cmp(&20)),
///     Err(Error::DuplicateKey { rank: 1 })
/// );
/// ```
pub struct OrderMaintenanceTree<V> {
    arena: NodeArena<V>,
    root: Link,
}

impl<V> OrderMaintenanceTree<V> {
    /// Creates an empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let tree: OrderMaintenanceTree<u64> = OrderMaintenanceTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
        }
    }

    /// Creates an empty tree with room for `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the storage cannot be reserved.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            arena: NodeArena::try_with_capacity(capacity)?,
            root: None,
        })
    }

    /// Builds a tree that takes ownership of `values`, already in rank order.
    ///
    /// The vector is moved into the tree, so the caller can no longer use it.
    /// No sorting or order check is performed.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the node storage cannot be reserved; the
    /// vector is dropped in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let values = vec![1, 2, 3];
    /// let tree = OrderMaintenanceTree::from_sorted_vec(values).unwrap();
    /// assert_eq!(tree.len(), 3);
    /// ```
    pub fn from_sorted_vec(values: Vec<V>) -> Result<Self> {
        Self::try_from_exact_iter(values.into_iter())
    }

    /// Builds a balanced tree from an iterator that yields values in rank order.
    pub(crate) fn try_from_exact_iter<I>(values: I) -> Result<Self>
    where
        I: ExactSizeIterator<Item = V>,
    {
        let count = values.len();
        let mut arena = NodeArena::try_with_capacity(count)?;
        for value in values {
            arena.push(value);
        }
        let root = arena.link_balanced();
        tracing::debug!(count, "bulk loaded tree");
        Ok(Self { arena, root })
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many elements fit before the node storage must grow.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the number of bytes held by the tree's own structure.
    ///
    /// Memory reachable through the elements is not counted.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.arena.memory_size()
    }

    /// Returns the element at `rank`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank >= len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30]).unwrap();
    /// assert_eq!(tree.fetch(2), Ok(&30));
    /// assert!(tree.fetch(3).is_err());
    /// ```
    pub fn fetch(&self, rank: usize) -> Result<&V> {
        Error::check_rank(rank, self.len())?;
        match self.arena.locate(self.root, rank) {
            Some(index) => Ok(&self.arena.node(index).value),
            None => unreachable!("rank {rank} is below the tree weight"),
        }
    }

    /// Replaces the element at `rank`, returning the previous one.
    ///
    /// Nothing is reordered or compared.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank >= len`.
    pub fn set_at(&mut self, rank: usize, value: V) -> Result<V> {
        Error::check_rank(rank, self.len())?;
        match self.arena.locate(self.root, rank) {
            Some(index) => Ok(std::mem::replace(
                &mut self.arena.node_mut(index).value,
                value,
            )),
            None => unreachable!("rank {rank} is below the tree weight"),
        }
    }

    /// Inserts `value` so that it becomes rank `rank`.
    ///
    /// Elements at ranks `rank..` move up by one; `rank == len` appends.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `rank > len`.
    /// - [`Error::OutOfMemory`] if the node cannot be allocated; the tree is
    ///   unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let mut tree = OrderMaintenanceTree::new();
    /// tree.insert_at("b", 0).unwrap();
    /// tree.insert_at("a", 0).unwrap();
    /// tree.insert_at("c", 2).unwrap();
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    /// assert!(tree.insert_at("z", 4).is_err());
    /// ```
    pub fn insert_at(&mut self, value: V, rank: usize) -> Result<()> {
        Error::check_rank(rank, self.len() + 1)?;
        self.arena.try_reserve(1)?;
        let new = self.arena.allocate(value);
        self.root = Some(self.arena.insert_at(self.root, rank, new));
        Ok(())
    }

    /// Removes the element at `rank` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank >= len`.
    pub fn delete_at(&mut self, rank: usize) -> Result<V> {
        Error::check_rank(rank, self.len())?;
        let Some(root) = self.root else {
            unreachable!("a non-empty tree has a root");
        };
        let (root, removed) = self.arena.unlink_at(root, rank);
        self.root = root;
        Ok(self.arena.release(removed))
    }

    /// Inserts `value` at its sorted position.
    ///
    /// `compare` orders a stored element against the value being inserted:
    /// it returns `Less` when the stored element belongs before it. Whatever
    /// the comparison needs beyond the stored element is captured by the
    /// closure. Returns the rank the value was inserted at.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] with the rank of an element comparing
    ///   `Equal`; nothing is inserted.
    /// - [`Error::OutOfMemory`] if the node cannot be allocated.
    pub fn insert_by<F>(&mut self, value: V, compare: F) -> Result<usize>
    where
        F: FnMut(&V) -> Ordering,
    {
        let rank = match self.search_by(compare) {
            Ok(rank) => return Err(Error::DuplicateKey { rank }),
            Err(rank) => rank,
        };
        self.insert_at(value, rank)?;
        Ok(rank)
    }

    /// Binary search over the tree, in the manner of
    /// [`slice::binary_search_by`].
    ///
    /// Returns `Ok(rank)` of an element comparing `Equal`, or `Err(rank)` of
    /// the position where such an element would be inserted.
    ///
    /// # Errors
    ///
    /// `Err(rank)` is the insertion point, not a failure.
    pub fn search_by<F>(&self, mut compare: F) -> std::result::Result<usize, usize>
    where
        F: FnMut(&V) -> Ordering,
    {
        let mut link = self.root;
        let mut offset = 0;
        while let Some(index) = link {
            let node = self.arena.node(index);
            let left_weight = self.arena.weight(node.left);
            match compare(&node.value) {
                Ordering::Less => {
                    offset += left_weight + 1;
                    link = node.right;
                }
                Ordering::Equal => return Ok(offset + left_weight),
                Ordering::Greater => link = node.left,
            }
        }
        Err(offset)
    }

    /// Calls `callback(value, rank)` for every element in rank order.
    ///
    /// Stops at and returns the first error produced by the callback.
    ///
    /// # Errors
    ///
    /// The first `Err` returned by `callback`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let tree = OrderMaintenanceTree::from_sorted_slice(&[1, 2, 3]).unwrap();
    /// let result = tree.iterate(|value, _rank| if *value == 2 { Err("two") } else { Ok(()) });
    /// assert_eq!(result, Err("two"));
    /// ```
    pub fn iterate<E, F>(&self, callback: F) -> std::result::Result<(), E>
    where
        F: FnMut(&V, usize) -> std::result::Result<(), E>,
    {
        self.iter().iterate_ranked(0, callback)
    }

    /// Removes every element, keeping the allocated node storage.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Returns an iterator over the elements in rank order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }
}

impl<V: Clone> OrderMaintenanceTree<V> {
    /// Builds a tree holding a copy of `values`, already in rank order.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the node storage cannot be reserved.
    pub fn from_sorted_slice(values: &[V]) -> Result<Self> {
        Self::try_from_exact_iter(values.iter().cloned())
    }
}

impl<V: Ord> OrderMaintenanceTree<V> {
    /// Inserts `value` at its position in the natural order of `V`.
    ///
    /// # Errors
    ///
    /// See [`OrderMaintenanceTree::insert_by`].
    pub fn insert_ordered(&mut self, value: V) -> Result<usize> {
        let rank = match self.search_by(|stored| stored.cmp(&value)) {
            Ok(rank) => return Err(Error::DuplicateKey { rank }),
            Err(rank) => rank,
        };
        self.insert_at(value, rank)?;
        Ok(rank)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<V> Default for OrderMaintenanceTree<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Collects values that are already in rank order.
///
/// # Panics
///
/// Panics if the node storage cannot be allocated, like `Vec` does.
impl<V> FromIterator<V> for OrderMaintenanceTree<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let values: Vec<V> = iter.into_iter().collect();
        match Self::from_sorted_vec(values) {
            Ok(tree) => tree,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<V: PartialEq> PartialEq for OrderMaintenanceTree<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for OrderMaintenanceTree<V> {}

impl<V: fmt::Debug> fmt::Debug for OrderMaintenanceTree<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<V: serde::Serialize> serde::Serialize for OrderMaintenanceTree<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct OrderMaintenanceTreeVisitor<V> {
    marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<'de, V> serde::de::Visitor<'de> for OrderMaintenanceTreeVisitor<V>
where
    V: serde::Deserialize<'de>,
{
    type Value = OrderMaintenanceTree<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence in rank order")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        OrderMaintenanceTree::from_sorted_vec(elements).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl<'de, V> serde::Deserialize<'de> for OrderMaintenanceTree<V>
where
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderMaintenanceTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use node::failpoint;
    use rstest::rstest;

    static_assertions::assert_impl_all!(OrderMaintenanceTree<u64>: Send, Sync);
    static_assertions::assert_not_impl_any!(OrderMaintenanceTree<std::rc::Rc<u64>>: Send, Sync);

    fn values(tree: &OrderMaintenanceTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[rstest]
    fn test_new_creates_empty() {
        let tree: OrderMaintenanceTree<i32> = OrderMaintenanceTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.fetch(0), Err(Error::InvalidArgument { rank: 0, limit: 0 }));
    }

    #[rstest]
    fn test_try_with_capacity_reserves_nodes() {
        let mut tree = OrderMaintenanceTree::try_with_capacity(64).unwrap();
        assert!(tree.capacity() >= 64);
        let capacity = tree.capacity();
        for value in 0..64 {
            tree.insert_at(value, value as usize).unwrap();
        }
        assert_eq!(tree.capacity(), capacity);
    }

    #[rstest]
    fn test_insert_at_keeps_invariants() {
        let mut tree = OrderMaintenanceTree::new();
        let mut expected = Vec::new();
        for value in 0..200 {
            let rank = (value as usize * 7) % (expected.len() + 1);
            tree.insert_at(value, rank).unwrap();
            expected.insert(rank, value);
            tree.arena.assert_invariants(tree.root);
        }
        assert_eq!(values(&tree), expected);
    }

    #[rstest]
    fn test_delete_at_keeps_invariants() {
        let mut tree = OrderMaintenanceTree::from_sorted_vec((0..200).collect()).unwrap();
        let mut expected: Vec<i32> = (0..200).collect();
        while !expected.is_empty() {
            let rank = (expected.len() * 5 / 7) % expected.len();
            assert_eq!(tree.delete_at(rank), Ok(expected.remove(rank)));
            tree.arena.assert_invariants(tree.root);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root, None);
    }

    #[rstest]
    fn test_set_at_returns_previous() {
        let mut tree = OrderMaintenanceTree::from_sorted_slice(&[1, 2, 3]).unwrap();
        assert_eq!(tree.set_at(1, 20), Ok(2));
        assert_eq!(values(&tree), vec![1, 20, 3]);
        assert_eq!(tree.set_at(3, 4), Err(Error::InvalidArgument { rank: 3, limit: 3 }));
    }

    #[rstest]
    fn test_search_by_reports_insertion_point() {
        let tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30]).unwrap();
        assert_eq!(tree.search_by(|stored| stored.cmp(&20)), Ok(1));
        assert_eq!(tree.search_by(|stored| stored.cmp(&5)), Err(0));
        assert_eq!(tree.search_by(|stored| stored.cmp(&25)), Err(2));
        assert_eq!(tree.search_by(|stored| stored.cmp(&35)), Err(3));
    }

    #[rstest]
    fn test_insert_ordered_builds_sorted_sequence() {
        let mut tree = OrderMaintenanceTree::new();
        for value in [5, 1, 4, 2, 3] {
            tree.insert_ordered(value).unwrap();
        }
        assert_eq!(values(&tree), vec![1, 2, 3, 4, 5]);
        assert_eq!(tree.insert_ordered(3), Err(Error::DuplicateKey { rank: 2 }));
        tree.arena.assert_invariants(tree.root);
    }

    #[rstest]
    fn test_clear_then_reuse() {
        let mut tree = OrderMaintenanceTree::from_sorted_slice(&[1, 2, 3]).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        tree.insert_at(9, 0).unwrap();
        assert_eq!(values(&tree), vec![9]);
    }

    #[rstest]
    fn test_memory_size_grows_with_capacity() {
        let empty: OrderMaintenanceTree<u64> = OrderMaintenanceTree::new();
        let reserved: OrderMaintenanceTree<u64> = OrderMaintenanceTree::try_with_capacity(100).unwrap();
        assert!(reserved.memory_size() > empty.memory_size());
    }

    #[rstest]
    fn test_equality_and_debug() {
        let first: OrderMaintenanceTree<i32> = (1..=3).collect();
        let mut second = OrderMaintenanceTree::new();
        second.insert_at(3, 0).unwrap();
        second.insert_at(1, 0).unwrap();
        second.insert_at(2, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(format!("{first:?}"), "[1, 2, 3]");
    }

    #[rstest]
    fn test_drop_releases_owned_values() {
        let shared = std::rc::Rc::new(());
        {
            let mut tree = OrderMaintenanceTree::new();
            for rank in 0..10 {
                tree.insert_at(std::rc::Rc::clone(&shared), rank).unwrap();
            }
            drop(tree.delete_at(3).unwrap());
            assert_eq!(std::rc::Rc::strong_count(&shared), 10);
        }
        assert_eq!(std::rc::Rc::strong_count(&shared), 1);
    }

    #[rstest]
    fn test_try_with_capacity_overflow_is_out_of_memory() {
        assert_eq!(
            OrderMaintenanceTree::<u64>::try_with_capacity(usize::MAX).err(),
            Some(Error::OutOfMemory { requested: usize::MAX })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(9)]
    fn test_insert_at_out_of_memory_keeps_tree(#[case] rank: usize) {
        let mut tree = OrderMaintenanceTree::from_sorted_vec((0..9).collect()).unwrap();
        failpoint::fail_after(0);
        assert_eq!(tree.insert_at(100, rank), Err(Error::OutOfMemory { requested: 1 }));
        tree.arena.assert_invariants(tree.root);
        assert_eq!(values(&tree), (0..9).collect::<Vec<_>>());

        tree.insert_at(100, rank).unwrap();
        assert_eq!(tree.fetch(rank), Ok(&100));
    }

    #[rstest]
    fn test_insert_ordered_out_of_memory_keeps_tree() {
        let mut tree = OrderMaintenanceTree::from_sorted_slice(&[10, 30]).unwrap();
        failpoint::fail_after(0);
        assert!(tree.insert_ordered(20).unwrap_err().is_out_of_memory());
        assert_eq!(values(&tree), vec![10, 30]);
        assert_eq!(tree.insert_ordered(20), Ok(1));
    }

    #[rstest]
    fn test_failed_insert_drops_value() {
        let shared = std::rc::Rc::new(());
        let mut tree = OrderMaintenanceTree::new();
        failpoint::fail_after(0);
        assert!(tree.insert_at(std::rc::Rc::clone(&shared), 0).is_err());
        assert!(tree.is_empty());
        assert_eq!(std::rc::Rc::strong_count(&shared), 1);
    }
}
