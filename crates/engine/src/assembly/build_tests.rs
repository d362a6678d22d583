// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use similar_asserts::assert_eq;
use ta_adapters::PlanningParameters;
use ta_core::test_support::task;

fn ordered(id: i64, index: i32, pinned: bool) -> OrderedTask {
    OrderedTask { task: task(id), index, pinned }
}

fn ids(list: &[OrderedTask]) -> Vec<i64> {
    list.iter().map(|t| t.task.id.get()).collect()
}

fn seeded() -> Vec<OrderedTask> {
    let mut list = Vec::new();
    for item in [
        ordered(1, 4, true),
        ordered(2, 7, true),
        ordered(3, 1, false),
        ordered(4, 3, false),
        ordered(5, 8, false),
    ] {
        insert_in_order(&mut list, item);
    }
    list
}

#[test]
fn seeding_in_order_keeps_order() {
    assert_eq!(ids(&seeded()), vec![1, 2, 3, 4, 5]);
}

#[test]
fn insertion_positions_regression() {
    let mut list = seeded();
    let cases = [
        (ordered(6, -1, true), 2),
        (ordered(7, -1, true), 3),
        (ordered(8, 5, true), 1),
        (ordered(9, 0, false), 5),
        (ordered(10, -1, false), 9),
        (ordered(11, 2, false), 7),
        (ordered(12, 7, true), 3),
        (ordered(13, 2, false), 9),
        (ordered(14, 3, true), 0),
    ];
    for (item, expected) in cases {
        let id = item.task.id.get();
        insert_in_order(&mut list, item);
        let position = list.iter().position(|t| t.task.id.get() == id).unwrap();
        assert_eq!(position, expected, "task {id} landed at {position}");
    }
    assert_eq!(ids(&list), vec![14, 1, 8, 2, 12, 6, 7, 9, 3, 11, 13, 4, 5, 10]);
}

fn users() -> Vec<DirectoryUser> {
    vec![DirectoryUser::new("john").with_groups(["HR"]), DirectoryUser::new("mary")]
}

fn chain(solution: &Solution, user: &str) -> Vec<i64> {
    solution.chain_ids(user).into_iter().map(TaskId::get).collect()
}

#[test]
fn ready_tasks_are_unassigned() {
    let records = vec![TaskRecord::new(1, "a", TaskStatus::Ready)];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    assert!(solution.task(TaskId::new(1)).unwrap().is_unassigned());
    assert!(cache.is_empty());
    solution.validate().unwrap();
}

#[test]
fn every_user_and_the_fallback_are_present() {
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&[], &users(), &mut cache).unwrap();

    let ids: Vec<&str> = solution.users().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["john", "mary", FALLBACK_USER_ID]);
    assert!(solution.user("john").unwrap().groups.contains("HR"));
    assert!(!solution.has_real_tasks());
}

#[test]
fn placeholder_is_pinned_on_fallback_user() {
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&[], &users(), &mut cache).unwrap();

    assert_eq!(chain(&solution, FALLBACK_USER_ID), vec![TaskId::PLACEHOLDER.get()]);
    assert!(solution.task(TaskId::PLACEHOLDER).unwrap().pinned);
}

#[test]
fn owned_tasks_follow_recorded_order() {
    let records = vec![
        TaskRecord::new(1, "a", TaskStatus::Reserved)
            .with_owner("john")
            .with_planning(PlanningParameters::new("john", 2)),
        TaskRecord::new(2, "b", TaskStatus::Reserved)
            .with_owner("john")
            .with_planning(PlanningParameters::new("john", 0)),
        TaskRecord::new(3, "c", TaskStatus::Reserved).with_owner("john"),
        TaskRecord::new(4, "d", TaskStatus::InProgress).with_owner("john"),
    ];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    // in progress is published and pinned, so it leads
    assert_eq!(chain(&solution, "john"), vec![4, 2, 1, 3]);
    assert!(solution.task(TaskId::new(4)).unwrap().pinned);
    assert!(cache.is_published(TaskId::new(4)));
    assert!(!cache.is_published(TaskId::new(1)));
    solution.validate().unwrap();
}

#[test]
fn recorded_index_ignored_when_owner_changed() {
    let records = vec![
        TaskRecord::new(1, "a", TaskStatus::Reserved)
            .with_owner("john")
            .with_planning(PlanningParameters::new("john", 1)),
        TaskRecord::new(2, "b", TaskStatus::Reserved)
            .with_owner("john")
            .with_planning(PlanningParameters::new("mary", 0)),
    ];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    assert_eq!(chain(&solution, "john"), vec![1, 2]);
}

#[yare::parameterized(
    published_param = { TaskStatus::Reserved, PlanningParameters::new("john", 0).published(true), true, true },
    pinned_param = { TaskStatus::Reserved, PlanningParameters::new("john", 0).pinned(true), false, true },
    plain = { TaskStatus::Suspended, PlanningParameters::new("john", 0), false, false },
    in_progress = { TaskStatus::InProgress, PlanningParameters::new("john", 0), true, true },
)]
fn published_and_pinned_flags(status: TaskStatus, params: PlanningParameters, published: bool, pinned: bool) {
    use similar_asserts::assert_eq;
    let records = vec![TaskRecord::new(1, "a", status).with_owner("john").with_planning(params)];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    assert_eq!(cache.is_published(TaskId::new(1)), published);
    assert_eq!(solution.task(TaskId::new(1)).unwrap().pinned, pinned);
}

#[test]
fn unknown_owner_demotes_to_unassigned() {
    let records = vec![TaskRecord::new(1, "a", TaskStatus::Reserved).with_owner("ghost")];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    let task = solution.task(TaskId::new(1)).unwrap();
    assert!(task.is_unassigned());
    assert!(!task.pinned);
}

#[test]
fn ownerless_suspended_and_terminal_tasks_are_skipped() {
    let records = vec![
        TaskRecord::new(1, "a", TaskStatus::Suspended),
        TaskRecord::new(2, "b", TaskStatus::Completed).with_owner("john"),
    ];
    let mut cache = PublishedTaskCache::new();
    let solution = build_solution(&records, &users(), &mut cache).unwrap();

    assert!(!solution.has_real_tasks());
}

#[test]
fn invalid_priority_fails_build() {
    let records = vec![TaskRecord::new(1, "a", TaskStatus::Ready).with_priority(11)];
    let mut cache = PublishedTaskCache::new();
    let err = build_solution(&records, &users(), &mut cache).unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidPriority { task, .. } if task == TaskId::new(1)));
}
