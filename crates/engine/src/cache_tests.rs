// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn mark_reports_first_insert_only() {
    let mut cache = PublishedTaskCache::new();
    assert!(cache.mark(TaskId::new(1)));
    assert!(!cache.mark(TaskId::new(1)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn snapshot_is_isolated_from_later_marks() {
    let mut cache = PublishedTaskCache::new();
    cache.mark(TaskId::new(1));
    let snapshot = cache.snapshot();

    cache.extend([TaskId::new(2), TaskId::new(3)]);

    assert!(snapshot.is_published(TaskId::new(1)));
    assert!(!snapshot.is_published(TaskId::new(2)));
    assert_eq!(cache.len(), 3);
}

#[test]
fn forget_removes_a_released_task() {
    let mut cache = PublishedTaskCache::new();
    cache.mark(TaskId::new(4));

    assert!(cache.forget(TaskId::new(4)));
    assert!(!cache.forget(TaskId::new(4)));
    assert!(cache.is_empty());
}
