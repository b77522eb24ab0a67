//! Heaviside search.
//!
//! A heaviside predicate maps a stored element to an [`Ordering`]: `Less`
//! for elements before the region of interest, `Equal` inside it, and
//! `Greater` after it. Along ascending rank the signs must never decrease,
//! so the sequence splits into at most three runs:
//!
//! ```text
//!   rank:   0   1   2   3   4   5   6   7
//!   sign:   -   -   -   0   0   +   +   +
//!                       ^       ^
//!              first zero       first positive
//! ```
//!
//! Each search is one root-to-leaf descent toward a sign transition, so it
//! calls the predicate O(log N) times. The precondition is not checked.

use std::cmp::Ordering;

use super::OrderMaintenanceTree;
use crate::error::{Error, Result};

/// Which side of the zero run a directional search looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    /// The last element whose sign is negative.
    Predecessor,
    /// The first element whose sign is positive.
    Successor,
}

impl<V> OrderMaintenanceTree<V> {
    /// Finds the first element for which `heaviside` returns `Equal`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no element is `Equal`. Its `boundary` holds
    /// the rank where the zero run would begin: the first rank whose sign is
    /// not `Less`, or `len` if every sign is `Less`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::{Error, OrderMaintenanceTree};
    ///
    /// let tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30, 40]).unwrap();
    /// assert_eq!(tree.find_zero(|value| value.cmp(&30)), Ok((2, &30)));
    /// assert_eq!(
    ///     tree.find_zero(|value| value.cmp(&25)),
    ///     Err(Error::NotFound { boundary: Some(2) })
    /// );
    /// ```
    pub fn find_zero<H>(&self, heaviside: H) -> Result<(usize, &V)>
    where
        H: FnMut(&V) -> Ordering,
    {
        match self.descend_to_boundary(heaviside) {
            (rank, Some((value, Ordering::Equal))) => Ok((rank, value)),
            (boundary, _) => Err(Error::NotFound {
                boundary: Some(boundary),
            }),
        }
    }

    /// Finds the element on the requested side of the zero run.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] (without a boundary) when that side is empty.
    pub fn find<H>(&self, direction: SearchDirection, heaviside: H) -> Result<(usize, &V)>
    where
        H: FnMut(&V) -> Ordering,
    {
        match direction {
            SearchDirection::Predecessor => self.find_predecessor(heaviside),
            SearchDirection::Successor => self.find_successor(heaviside),
        }
    }

    /// Finds the last element for which `heaviside` returns `Less`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no element is `Less`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let tree = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30, 40]).unwrap();
    /// assert_eq!(tree.find_predecessor(|value| value.cmp(&25)), Ok((1, &20)));
    /// assert!(tree.find_predecessor(|value| value.cmp(&5)).is_err());
    /// ```
    pub fn find_predecessor<H>(&self, heaviside: H) -> Result<(usize, &V)>
    where
        H: FnMut(&V) -> Ordering,
    {
        let (boundary, _) = self.descend_to_boundary(heaviside);
        let Some(rank) = boundary.checked_sub(1) else {
            return Err(Error::NotFound { boundary: None });
        };
        Ok((rank, self.fetch(rank)?))
    }

    /// Finds the first element for which `heaviside` returns `Greater`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no element is `Greater`.
    pub fn find_successor<H>(&self, mut heaviside: H) -> Result<(usize, &V)>
    where
        H: FnMut(&V) -> Ordering,
    {
        let positive_only = |value: &V| match heaviside(value) {
            Ordering::Greater => Ordering::Greater,
            Ordering::Less | Ordering::Equal => Ordering::Less,
        };
        match self.descend_to_boundary(positive_only) {
            (rank, Some((value, _))) => Ok((rank, value)),
            (_, None) => Err(Error::NotFound { boundary: None }),
        }
    }

    /// Descends to the first rank whose sign is not `Less`.
    ///
    /// Returns that rank (or `len`) along with the element found there and
    /// the sign `heaviside` gave it, so callers can tell zero from positive
    /// without calling the predicate again.
    fn descend_to_boundary<H>(&self, mut heaviside: H) -> (usize, Option<(&V, Ordering)>)
    where
        H: FnMut(&V) -> Ordering,
    {
        let arena = &self.arena;
        let mut link = self.root;
        let mut offset = 0;
        let mut candidate = None;
        while let Some(index) = link {
            let node = arena.node(index);
            let left_weight = arena.weight(node.left);
            match heaviside(&node.value) {
                Ordering::Less => {
                    offset += left_weight + 1;
                    link = node.right;
                }
                sign => {
                    candidate = Some((offset + left_weight, &node.value, sign));
                    link = node.left;
                }
            }
        }
        match candidate {
            Some((rank, value, sign)) => (rank, Some((value, sign))),
            None => (offset, None),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
