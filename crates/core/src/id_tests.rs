// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

#[test]
fn user_id_hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(UserId::new("katy"), 42);
    assert_eq!(map.get("katy"), Some(&42));
}

#[test]
fn user_id_serializes_as_bare_string() {
    let id = UserId::new("john");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""john""#);
    let decoded: UserId = serde_json::from_str(r#""john""#).unwrap();
    assert_eq!(decoded, "john");
}

#[test]
fn empty_group_id_is_empty() {
    assert!(GroupId::new("").is_empty());
    assert!(!GroupId::new("HR").is_empty());
}

#[test]
fn task_id_serializes_as_number() {
    assert_eq!(serde_json::to_string(&TaskId::new(17)).unwrap(), "17");
    let decoded: TaskId = serde_json::from_str("17").unwrap();
    assert_eq!(decoded, TaskId::from(17));
}

#[test]
fn only_the_reserved_id_is_the_placeholder() {
    assert!(TaskId::PLACEHOLDER.is_placeholder());
    assert!(!TaskId::new(0).is_placeholder());
    assert!(!TaskId::new(1).is_placeholder());
}
