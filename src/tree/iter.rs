//! In-order iteration over an [`OrderMaintenanceTree`].
//!
//! Both iterators walk the tree with an explicit stack of pending ancestors,
//! visiting each node once, so a full pass costs O(N) and positioning at an
//! arbitrary rank costs O(log N).

use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

use smallvec::SmallVec;

use super::OrderMaintenanceTree;
use super::node::{Link, NodeArena, NodeIndex};
use crate::error::{Error, Result};

/// Inline stack depth; an AVL tree this tall holds far more than `u32::MAX`
/// elements, so the stack practically never spills.
const STACK_DEPTH: usize = 48;

type AncestorStack = SmallVec<[NodeIndex; STACK_DEPTH]>;

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// An iterator over references to the elements of an
/// [`OrderMaintenanceTree`], in rank order.
pub struct Iter<'a, V> {
    arena: &'a NodeArena<V>,
    /// Nodes whose value is still due, innermost on top.
    stack: AncestorStack,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(super) fn new(tree: &'a OrderMaintenanceTree<V>) -> Self {
        Self::starting_at(tree, 0, tree.len())
    }

    /// Positions an iterator on `first_rank`, yielding `count` elements.
    fn starting_at(tree: &'a OrderMaintenanceTree<V>, first_rank: usize, count: usize) -> Self {
        let arena = &tree.arena;
        let mut stack = AncestorStack::new();
        let mut link = tree.root;
        let mut rank = first_rank;
        while let Some(index) = link {
            let node = arena.node(index);
            let left_weight = arena.weight(node.left);
            if rank < left_weight {
                stack.push(index);
                link = node.left;
            } else if rank == left_weight {
                stack.push(index);
                break;
            } else {
                rank -= left_weight + 1;
                link = node.right;
            }
        }
        Self {
            arena,
            stack,
            remaining: count,
        }
    }

    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(index) = link {
            self.stack.push(index);
            link = self.arena.node(index).left;
        }
    }

    /// Feeds each remaining element and its rank to `callback`, stopping at
    /// the first error.
    pub(super) fn iterate_ranked<E, F>(self, first_rank: usize, mut callback: F) -> std::result::Result<(), E>
    where
        F: FnMut(&V, usize) -> std::result::Result<(), E>,
    {
        for (offset, value) in self.enumerate() {
            callback(value, first_rank + offset)?;
        }
        Ok(())
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.stack.pop()?;
        let node = self.arena.node(index);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over the elements of an [`OrderMaintenanceTree`].
///
/// Elements not yet yielded are dropped with the iterator.
pub struct IntoIter<V> {
    arena: NodeArena<V>,
    stack: AncestorStack,
}

impl<V> IntoIter<V> {
    fn new(tree: OrderMaintenanceTree<V>) -> Self {
        let mut iterator = Self {
            arena: tree.arena,
            stack: AncestorStack::new(),
        };
        iterator.push_left_spine(tree.root);
        iterator
    }

    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(index) = link {
            self.stack.push(index);
            link = self.arena.node(index).left;
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let right = self.arena.node(index).right;
        self.push_left_spine(right);
        Some(self.arena.release(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.arena.len(), Some(self.arena.len()))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

// =============================================================================
// Rank Ranges
// =============================================================================

impl<V> OrderMaintenanceTree<V> {
    /// Returns an iterator over the elements whose ranks fall in `range`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the range ends past `len` or starts
    /// after it ends.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let tree: OrderMaintenanceTree<i32> = (0..10).collect();
    /// let middle: Vec<i32> = tree.range(3..6).unwrap().copied().collect();
    /// assert_eq!(middle, vec![3, 4, 5]);
    /// assert!(tree.range(5..11).is_err());
    /// ```
    pub fn range<R>(&self, range: R) -> Result<Iter<'_, V>>
    where
        R: RangeBounds<usize>,
    {
        let (start, end) = self.resolve_range(&range)?;
        Ok(Iter::starting_at(self, start, end - start))
    }

    /// Calls `callback(value, rank)` for the elements whose ranks fall in
    /// `range`, in rank order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// An invalid range is reported through `E::from` before any callback
    /// runs; otherwise the first `Err` returned by `callback`.
    pub fn iterate_on_range<R, E, F>(&self, range: R, callback: F) -> std::result::Result<(), E>
    where
        R: RangeBounds<usize>,
        E: From<Error>,
        F: FnMut(&V, usize) -> std::result::Result<(), E>,
    {
        let (start, end) = self.resolve_range(&range)?;
        Iter::starting_at(self, start, end - start).iterate_ranked(start, callback)
    }

    fn resolve_range<R>(&self, range: &R) -> Result<(usize, usize)>
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(start) => *start,
            Bound::Excluded(start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => end.saturating_add(1),
            Bound::Excluded(end) => *end,
            Bound::Unbounded => self.len(),
        };
        Error::check_rank(end, self.len() + 1)?;
        Error::check_rank(start, end + 1)?;
        Ok((start, end))
    }
}

impl<V> IntoIterator for OrderMaintenanceTree<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, V> IntoIterator for &'a OrderMaintenanceTree<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
