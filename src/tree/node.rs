//! Node storage and AVL primitives.
//!
//! Nodes live in a slot arena addressed by [`NodeIndex`]. Slots freed by
//! deletions are threaded onto a free list and reused by later insertions,
//! so the arena only grows when no vacant slot is left. Growth goes through
//! `try_reserve`, which lets every insertion fail cleanly before it touches
//! the tree.

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Position of a node inside a [`NodeArena`].
pub(crate) type NodeIndex = usize;

/// A link to a child subtree.
pub(crate) type Link = Option<NodeIndex>;

// =============================================================================
// Reservation Failure Injection
// =============================================================================


#[cfg(not(test))]
pub(crate) mod failpoint {
    #[inline]
    pub(crate) const fn triggered() -> bool {
        false
    }
}

/// Reports an injected reservation failure for `requested` slots.
#[inline]
pub(crate) fn check_failpoint(requested: usize) -> Result<()> {
    if failpoint::triggered() {
        Err(Error::out_of_memory(requested))
    } else {
        Ok(())
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// A tree node: one element plus the metadata needed for rank lookups.
#[derive(Clone, Debug)]
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    /// Number of elements in the subtree rooted here.
    pub(crate) weight: usize,
    pub(crate) height: u8,
}

impl<V> Node<V> {
    const fn leaf(value: V) -> Self {
        Self {
            value,
            left: None,
            right: None,
            weight: 1,
            height: 1,
        }
    }
}

#[derive(Clone, Debug)]
enum Slot<V> {
    Occupied(Node<V>),
    Vacant { next_free: Link },
}

// =============================================================================
// NodeArena Definition
// =============================================================================

/// Slot arena owning every node of one tree.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<V> {
    slots: Vec<Slot<V>>,
    free_head: Link,
    occupied: usize,
}

impl<V> NodeArena<V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            occupied: 0,
        }
    }

    /// Creates an arena able to hold `capacity` nodes without reallocating.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self> {
        check_failpoint(capacity)?;
        let mut arena = Self::new();
        arena
            .slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::out_of_memory(capacity))?;
        Ok(arena)
    }

    /// Number of occupied slots.
    pub(crate) const fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Bytes held by the slot vector.
    pub(crate) fn memory_size(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<V>>()
    }

    /// Guarantees that the next `additional` allocations cannot fail.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<()> {
        check_failpoint(additional)?;
        let vacant = self.slots.len() - self.occupied;
        if additional <= vacant {
            return Ok(());
        }
        let missing = additional - vacant;
        self.slots
            .try_reserve(missing)
            .map_err(|_| Error::out_of_memory(missing))
    }

    /// Stores `value` in a fresh leaf node.
    ///
    /// Callers reserve room first; the push below then never reallocates.
    pub(crate) fn allocate(&mut self, value: V) -> NodeIndex {
        let node = Slot::Occupied(Node::leaf(value));
        self.occupied += 1;
        match self.free_head {
            Some(index) => {
                let previous = std::mem::replace(&mut self.slots[index], node);
                self.free_head = match previous {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                index
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    /// Removes the node at `index` and hands back its value.
    pub(crate) fn release(&mut self, index: NodeIndex) -> V {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(index);
                self.occupied -= 1;
                node.value
            }
            Slot::Vacant { .. } => unreachable!("released a vacant slot"),
        }
    }

    /// Drops every node, keeping the slot vector's capacity.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }

    #[inline]
    pub(crate) fn node(&self, index: NodeIndex) -> &Node<V> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to a vacant slot"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node<V> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to a vacant slot"),
        }
    }

    // =========================================================================
    // Subtree Metadata
    // =========================================================================

    #[inline]
    pub(crate) fn weight(&self, link: Link) -> usize {
        link.map_or(0, |index| self.node(index).weight)
    }

    #[inline]
    fn height(&self, link: Link) -> u8 {
        link.map_or(0, |index| self.node(index).height)
    }

    /// Recomputes weight and height of `index` from its children.
    fn update(&mut self, index: NodeIndex) {
        let (left, right) = {
            let node = self.node(index);
            (node.left, node.right)
        };
        let weight = self.weight(left) + self.weight(right) + 1;
        let height = self.height(left).max(self.height(right)) + 1;
        let node = self.node_mut(index);
        node.weight = weight;
        node.height = height;
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    fn rotate_left(&mut self, index: NodeIndex) -> NodeIndex {
        let Some(pivot) = self.node(index).right else {
            return index;
        };
        self.node_mut(index).right = self.node(pivot).left;
        self.node_mut(pivot).left = Some(index);
        self.update(index);
        self.update(pivot);
        pivot
    }

    fn rotate_right(&mut self, index: NodeIndex) -> NodeIndex {
        let Some(pivot) = self.node(index).left else {
            return index;
        };
        self.node_mut(index).left = self.node(pivot).right;
        self.node_mut(pivot).right = Some(index);
        self.update(index);
        self.update(pivot);
        pivot
    }

    /// Restores the AVL balance of `index` after one of its subtrees changed
    /// height by at most one, returning the new subtree root.
    fn rebalance(&mut self, index: NodeIndex) -> NodeIndex {
        self.update(index);
        let (left, right) = {
            let node = self.node(index);
            (node.left, node.right)
        };
        let left_height = i16::from(self.height(left));
        let right_height = i16::from(self.height(right));

        match left_height - right_height {
            2 => {
                if let Some(child) = left {
                    let child_node = self.node(child);
                    if self.height(child_node.left) < self.height(child_node.right) {
                        let rotated = self.rotate_left(child);
                        self.node_mut(index).left = Some(rotated);
                    }
                }
                self.rotate_right(index)
            }
            -2 => {
                if let Some(child) = right {
                    let child_node = self.node(child);
                    if self.height(child_node.right) < self.height(child_node.left) {
                        let rotated = self.rotate_right(child);
                        self.node_mut(index).right = Some(rotated);
                    }
                }
                self.rotate_left(index)
            }
            _ => index,
        }
    }

    // =========================================================================
    // Rank Operations
    // =========================================================================

    /// Finds the node holding `rank` within the subtree at `link`.
    pub(crate) fn locate(&self, mut link: Link, mut rank: usize) -> Option<NodeIndex> {
        while let Some(index) = link {
            let node = self.node(index);
            let left_weight = self.weight(node.left);
            match rank.cmp(&left_weight) {
                Ordering::Less => link = node.left,
                Ordering::Equal => return Some(index),
                Ordering::Greater => {
                    rank -= left_weight + 1;
                    link = node.right;
                }
            }
        }
        None
    }

    /// Links the already allocated leaf `new` so that it becomes rank `rank`
    /// of the subtree at `link`. Returns the new subtree root.
    pub(crate) fn insert_at(&mut self, link: Link, rank: usize, new: NodeIndex) -> NodeIndex {
        let Some(index) = link else {
            return new;
        };
        let (left, right) = {
            let node = self.node(index);
            (node.left, node.right)
        };
        let left_weight = self.weight(left);
        if rank <= left_weight {
            let subtree = self.insert_at(left, rank, new);
            self.node_mut(index).left = Some(subtree);
        } else {
            let subtree = self.insert_at(right, rank - left_weight - 1, new);
            self.node_mut(index).right = Some(subtree);
        }
        self.rebalance(index)
    }

    /// Unlinks the node at `rank` from the subtree rooted at `index`.
    ///
    /// Returns the new subtree root and the unlinked node, which is still
    /// allocated.
    pub(crate) fn unlink_at(&mut self, index: NodeIndex, rank: usize) -> (Link, NodeIndex) {
        let (left, right) = {
            let node = self.node(index);
            (node.left, node.right)
        };
        let left_weight = self.weight(left);

        match (rank.cmp(&left_weight), left, right) {
            (Ordering::Less, Some(child), _) => {
                let (subtree, removed) = self.unlink_at(child, rank);
                self.node_mut(index).left = subtree;
                (Some(self.rebalance(index)), removed)
            }
            (Ordering::Greater, _, Some(child)) => {
                let (subtree, removed) = self.unlink_at(child, rank - left_weight - 1);
                self.node_mut(index).right = subtree;
                (Some(self.rebalance(index)), removed)
            }
            (Ordering::Equal, None, only) | (Ordering::Equal, only, None) => (only, index),
            (Ordering::Equal, Some(left), Some(right)) => {
                let (subtree, successor) = self.unlink_first(right);
                let node = self.node_mut(successor);
                node.left = Some(left);
                node.right = subtree;
                (Some(self.rebalance(successor)), index)
            }
            _ => unreachable!("rank {rank} exceeds the subtree weight"),
        }
    }

    /// Unlinks the leftmost node of the subtree rooted at `index`.
    fn unlink_first(&mut self, index: NodeIndex) -> (Link, NodeIndex) {
        match self.node(index).left {
            None => (self.node(index).right, index),
            Some(child) => {
                let (subtree, first) = self.unlink_first(child);
                self.node_mut(index).left = subtree;
                (Some(self.rebalance(index)), first)
            }
        }
    }

    // =========================================================================
    // Bulk Construction
    // =========================================================================

    /// Appends `value` as an unlinked node; used while bulk loading.
    ///
    /// Only valid on an arena without vacant slots whose capacity was
    /// reserved up front.
    pub(crate) fn push(&mut self, value: V) {
        debug_assert!(self.free_head.is_none());
        self.slots.push(Slot::Occupied(Node::leaf(value)));
        self.occupied += 1;
    }

    /// Links slots `0..len` into a perfectly balanced tree whose in-order
    /// sequence is the slot order. Returns the root.
    pub(crate) fn link_balanced(&mut self) -> Link {
        debug_assert!(self.free_head.is_none());
        self.link_range(0, self.slots.len())
    }

    fn link_range(&mut self, start: usize, end: usize) -> Link {
        if start >= end {
            return None;
        }
        let middle = start + (end - start) / 2;
        let left = self.link_range(start, middle);
        let right = self.link_range(middle + 1, end);
        let node = self.node_mut(middle);
        node.left = left;
        node.right = right;
        self.update(middle);
        Some(middle)
    }

    /// Collects the node indices of the subtree at `root` in rank order.
    pub(crate) fn in_order(&self, root: Link) -> Result<Vec<NodeIndex>> {
        let count = self.weight(root);
        check_failpoint(count)?;
        let mut order = Vec::new();
        order
            .try_reserve_exact(count)
            .map_err(|_| Error::out_of_memory(count))?;

        let mut stack: smallvec::SmallVec<[NodeIndex; 48]> = smallvec::SmallVec::new();
        let mut link = root;
        loop {
            while let Some(index) = link {
                stack.push(index);
                link = self.node(index).left;
            }
            let Some(index) = stack.pop() else {
                break;
            };
            order.push(index);
            link = self.node(index).right;
        }
        Ok(order)
    }

    /// Checks the AVL, weight and slot bookkeeping invariants.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, root: Link) {
        fn walk<V>(arena: &NodeArena<V>, link: Link) -> (usize, u8) {
            let Some(index) = link else {
                return (0, 0);
            };
            let node = arena.node(index);
            let (left_weight, left_height) = walk(arena, node.left);
            let (right_weight, right_height) = walk(arena, node.right);
            assert!(
                left_height.abs_diff(right_height) <= 1,
                "node {index} is unbalanced ({left_height} vs {right_height})"
            );
            assert_eq!(node.weight, left_weight + right_weight + 1);
            assert_eq!(node.height, left_height.max(right_height) + 1);
            (node.weight, node.height)
        }

        let (weight, _) = walk(self, root);
        assert_eq!(weight, self.occupied, "tree weight disagrees with arena");
    }
}

// =============================================================================
// Tests
// =============================================================================
