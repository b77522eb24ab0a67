#![cfg(feature = "serde")]

//! Integration tests for serde support of OrderMaintenanceTree.

use omtree::OrderMaintenanceTree;
use rstest::rstest;

#[rstest]
fn test_tree_json_roundtrip() {
    let tree: OrderMaintenanceTree<i32> = (1..=10).collect();
    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, "[1,2,3,4,5,6,7,8,9,10]");
    let restored: OrderMaintenanceTree<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(tree, restored);
}

#[rstest]
fn test_tree_keeps_rank_order_not_value_order() {
    let restored: OrderMaintenanceTree<String> = serde_json::from_str(r#"["c","a","b"]"#).unwrap();
    assert_eq!(restored.fetch(0).map(String::as_str), Ok("c"));
    assert_eq!(serde_json::to_string(&restored).unwrap(), r#"["c","a","b"]"#);
}

#[rstest]
fn test_empty_tree_roundtrip() {
    let tree: OrderMaintenanceTree<u8> = OrderMaintenanceTree::new();
    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, "[]");
    let restored: OrderMaintenanceTree<u8> = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
}

#[rstest]
fn test_nested_trees() {
    let inner: OrderMaintenanceTree<i32> = (1..=3).collect();
    let outer: OrderMaintenanceTree<OrderMaintenanceTree<i32>> =
        vec![inner.clone(), inner].into_iter().collect();
    let json = serde_json::to_string(&outer).unwrap();
    assert_eq!(json, "[[1,2,3],[1,2,3]]");
    let restored: OrderMaintenanceTree<OrderMaintenanceTree<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(outer, restored);
}

#[rstest]
fn test_rejects_non_sequence() {
    let result: Result<OrderMaintenanceTree<i32>, _> = serde_json::from_str(r#"{"a":1}"#);
    assert!(result.is_err());
}
