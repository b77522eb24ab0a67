//! Ready-made heaviside predicates for ordered keys.
//!
//! The search methods of [`OrderMaintenanceTree`](crate::OrderMaintenanceTree)
//! accept any `FnMut(&V) -> Ordering`. For trees whose elements are (or
//! borrow as) an `Ord` key, the builders here cover the usual shapes:
//!
//! - [`equal_to`]: the zero run is the elements equal to one key
//! - [`at_least`]: the zero run starts at the first element not below a key
//! - [`below`]: the zero run is every element below a key
//! - [`within`]: the zero run is the elements inside a range of keys
//!
//! # Examples
//!
//! ```rust
//! use omtree::{OrderMaintenanceTree, heaviside};
//!
//! let tree = OrderMaintenanceTree::from_sorted_slice(&[2, 4, 6, 8, 10]).unwrap();
//!
//! // First element in [5, 9)
//! assert_eq!(tree.find_zero(heaviside::within(5..9)), Ok((2, &6)));
//! // Last element before the range, first element after it
//! assert_eq!(tree.find_predecessor(heaviside::within(5..9)), Ok((1, &4)));
//! assert_eq!(tree.find_successor(heaviside::within(5..9)), Ok((4, &10)));
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};

/// Compares each element against `key`.
///
/// Elements below `key` are negative, equal ones zero, larger ones positive.
pub fn equal_to<K, V>(key: K) -> impl Fn(&V) -> Ordering
where
    K: Ord,
    V: Borrow<K>,
{
    move |value: &V| <V as Borrow<K>>::borrow(value).cmp(&key)
}

/// Treats elements below `key` as negative and all others as zero.
///
/// [`find_zero`](crate::OrderMaintenanceTree::find_zero) then yields the
/// lower bound of `key` and
/// [`find_predecessor`](crate::OrderMaintenanceTree::find_predecessor) the
/// last element below it.
pub fn at_least<K, V>(key: K) -> impl Fn(&V) -> Ordering
where
    K: Ord,
    V: Borrow<K>,
{
    move |value: &V| {
        if <V as Borrow<K>>::borrow(value) < &key {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

/// Treats elements below `key` as zero and all others as positive.
///
/// [`find_successor`](crate::OrderMaintenanceTree::find_successor) then
/// yields the lower bound of `key`.
pub fn below<K, V>(key: K) -> impl Fn(&V) -> Ordering
where
    K: Ord,
    V: Borrow<K>,
{
    move |value: &V| {
        if <V as Borrow<K>>::borrow(value) < &key {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }
}

/// Places each element relative to `range`.
///
/// Elements before the range are negative, elements inside it zero, and
/// elements after it positive. An empty range makes every element either
/// negative or positive.
pub fn within<K, V, R>(range: R) -> impl Fn(&V) -> Ordering
where
    K: Ord,
    V: Borrow<K>,
    R: RangeBounds<K>,
{
    move |value: &V| {
        let key = <V as Borrow<K>>::borrow(value);
        let before_start = match range.start_bound() {
            Bound::Included(start) => key < start,
            Bound::Excluded(start) => key <= start,
            Bound::Unbounded => false,
        };
        if before_start {
            return Ordering::Less;
        }
        let after_end = match range.end_bound() {
            Bound::Included(end) => key > end,
            Bound::Excluded(end) => key >= end,
            Bound::Unbounded => false,
        };
        if after_end {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}
