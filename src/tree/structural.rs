//! Split, merge and clone.
//!
//! Each operation here rebuilds whole trees through the bulk loader, so it
//! costs O(N) and always yields a perfectly balanced result. Every
//! reservation happens before the first value moves, which keeps the
//! operations atomic when memory runs out.

use std::ops::Deref;

use super::OrderMaintenanceTree;
use super::node::NodeArena;
use super::payload::OwnedPayload;
use crate::error::{Error, MergeError, Result};

impl<V> OrderMaintenanceTree<V> {
    /// Splits the tree at `rank`.
    ///
    /// `self` keeps ranks `0..rank`; the returned tree holds the former ranks
    /// `rank..len`, renumbered from zero.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `rank > len`.
    /// - [`Error::OutOfMemory`] if either half cannot be allocated; `self`
    ///   is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let mut left = OrderMaintenanceTree::from_sorted_slice(&[10, 20, 30]).unwrap();
    /// let right = left.split_at(1).unwrap();
    /// assert_eq!(left.iter().copied().collect::<Vec<_>>(), vec![10]);
    /// assert_eq!(right.iter().copied().collect::<Vec<_>>(), vec![20, 30]);
    /// ```
    pub fn split_at(&mut self, rank: usize) -> Result<Self> {
        Error::check_rank(rank, self.len() + 1)?;
        let total = self.len();
        if rank == total {
            return Ok(Self::new());
        }
        if rank == 0 {
            return Ok(std::mem::take(self));
        }

        let order = self.arena.in_order(self.root)?;
        let mut left = NodeArena::try_with_capacity(rank)?;
        let mut right = NodeArena::try_with_capacity(total - rank)?;
        for (position, index) in order.into_iter().enumerate() {
            let value = self.arena.release(index);
            if position < rank {
                left.push(value);
            } else {
                right.push(value);
            }
        }

        self.root = left.link_balanced();
        self.arena = left;
        tracing::debug!(left = rank, right = total - rank, "split tree");
        let root = right.link_balanced();
        Ok(Self { arena: right, root })
    }

    /// Moves every element of `other` to the end of `self`, leaving `other`
    /// empty.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the combined tree cannot be allocated; both
    /// trees are unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let mut front = OrderMaintenanceTree::from_sorted_slice(&[1, 2]).unwrap();
    /// let mut back = OrderMaintenanceTree::from_sorted_slice(&[3]).unwrap();
    /// front.append(&mut back).unwrap();
    /// assert_eq!(front.len(), 3);
    /// assert!(back.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            std::mem::swap(self, other);
            return Ok(());
        }

        let front = self.arena.in_order(self.root)?;
        let back = other.arena.in_order(other.root)?;
        let total = front.len() + back.len();
        let mut arena = NodeArena::try_with_capacity(total)?;
        for index in front {
            arena.push(self.arena.release(index));
        }
        for index in back {
            arena.push(other.arena.release(index));
        }

        self.root = arena.link_balanced();
        self.arena = arena;
        other.clear();
        tracing::debug!(total, "appended tree");
        Ok(())
    }

    /// Concatenates `left` and `right` into one tree.
    ///
    /// # Errors
    ///
    /// [`MergeError`] wrapping [`Error::OutOfMemory`] if the combined tree
    /// cannot be allocated. It hands both inputs back unchanged through
    /// [`MergeError::into_inputs`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let left = OrderMaintenanceTree::from_sorted_slice(&[10]).unwrap();
    /// let right = OrderMaintenanceTree::from_sorted_slice(&[20, 30]).unwrap();
    /// let merged = OrderMaintenanceTree::merge(left, right).unwrap();
    /// assert_eq!(merged.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    /// ```
    pub fn merge(mut left: Self, mut right: Self) -> std::result::Result<Self, MergeError<V>> {
        match left.append(&mut right) {
            Ok(()) => Ok(left),
            Err(error) => Err(MergeError::new(error, left, right)),
        }
    }
}

// =============================================================================
// Clones
// =============================================================================

impl<V: Clone> OrderMaintenanceTree<V> {
    /// Copies the tree, cloning each element by value.
    ///
    /// For handle types such as `Rc` this shares the payloads with the
    /// source.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the copy cannot be allocated.
    pub fn clone_shallow(&self) -> Result<Self> {
        let tree = Self::try_from_exact_iter(self.iter().cloned())?;
        tracing::debug!(count = tree.len(), "shallow clone");
        Ok(tree)
    }
}

impl<V> Clone for OrderMaintenanceTree<V>
where
    V: Clone,
{
    /// # Panics
    ///
    /// Panics if the copy cannot be allocated; see
    /// [`clone_shallow`](Self::clone_shallow) for the fallible form.
    fn clone(&self) -> Self {
        match self.clone_shallow() {
            Ok(tree) => tree,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<V> OrderMaintenanceTree<V>
where
    V: Deref,
    V::Target: Clone + Sized,
{
    /// Deep-copies every payload into one contiguous block allocated from
    /// `pool`.
    ///
    /// The clone stores references into that block, so it cannot outlive the
    /// pool, and dropping the pool releases all payloads at once. The pool
    /// does not run payload destructors: prefer
    /// [`clone_individual`](Self::clone_individual) for payloads that own
    /// resources.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if either the node storage or the payload
    /// block cannot be allocated. Node storage is reserved first, so a
    /// failure there leaves `pool` untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bumpalo::Bump;
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let source = OrderMaintenanceTree::from_sorted_vec(vec![Box::new(1), Box::new(2)]).unwrap();
    /// let pool = Bump::new();
    /// let pooled = source.clone_pooled(&pool).unwrap();
    /// assert_eq!(pooled.fetch(1), Ok(&&2));
    /// ```
    #[cfg(feature = "pool")]
    pub fn clone_pooled<'pool>(
        &self,
        pool: &'pool bumpalo::Bump,
    ) -> Result<OrderMaintenanceTree<&'pool V::Target>>
    where
        V::Target: 'pool,
    {
        let count = self.len();
        let mut arena = NodeArena::try_with_capacity(count)?;

        super::node::check_failpoint(count)?;
        let mut payloads = bumpalo::collections::Vec::new_in(pool);
        payloads
            .try_reserve_exact(count)
            .map_err(|_| Error::out_of_memory(count))?;
        payloads.extend(self.iter().map(|value| (**value).clone()));
        let block: &'pool [V::Target] = payloads.into_bump_slice();

        for payload in block {
            arena.push(payload);
        }
        let root = arena.link_balanced();
        tracing::debug!(count, pool_bytes = pool.allocated_bytes(), "pooled clone");
        Ok(OrderMaintenanceTree { arena, root })
    }

    /// Deep-copies every payload into its own [`OwnedPayload`] allocation.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the node storage or any payload cannot be
    /// allocated. Copies made before the failure are dropped again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::rc::Rc;
    /// use omtree::OrderMaintenanceTree;
    ///
    /// let shared = Rc::new(7);
    /// let source = OrderMaintenanceTree::from_sorted_vec(vec![Rc::clone(&shared)]).unwrap();
    /// let copy = source.clone_individual().unwrap();
    /// assert_eq!(copy.fetch(0).map(|payload| **payload), Ok(7));
    /// assert_eq!(Rc::strong_count(&shared), 2);
    /// ```
    pub fn clone_individual(&self) -> Result<OrderMaintenanceTree<OwnedPayload<V::Target>>> {
        let count = self.len();
        let mut arena = NodeArena::try_with_capacity(count)?;
        for value in self {
            arena.push(OwnedPayload::try_new((**value).clone())?);
        }
        let root = arena.link_balanced();
        tracing::debug!(count, "individual clone");
        Ok(OrderMaintenanceTree { arena, root })
    }
}

// =============================================================================
// Tests
// =============================================================================
