// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use similar_asserts::assert_eq;
use ta_adapters::{FakeTaskRuntime, TaskRecord, TaskStatus};
use ta_core::test_support::{seed_chain, solution_with_users, task};
use ta_core::{Task, FALLBACK_USER_ID};

fn publisher(runtime: &FakeTaskRuntime, window: usize) -> SolutionPublisher<FakeTaskRuntime> {
    let config = PlannerConfig::default().publish_window(window).acting_user("planner-bot");
    SolutionPublisher::new(Arc::new(runtime.clone()), &config)
}

fn john_chain(ids: &[i64]) -> Solution {
    let mut solution = solution_with_users(&["john"]);
    seed_chain(&mut solution, "john", ids.iter().map(|id| task(*id)).collect());
    solution
}

fn flags(plan: &PublishPlan) -> Vec<(i64, i32, bool, bool)> {
    plan.results
        .iter()
        .map(|r| (r.task_id.get(), r.parameters.index, r.parameters.published, r.parameters.pinned))
        .collect()
}

#[test]
fn window_exposes_head_of_chain() {
    let runtime = FakeTaskRuntime::new();
    let plan = publisher(&runtime, 2).plan(&john_chain(&[1, 2, 3]), &PublishedTaskCache::new());

    assert_eq!(
        flags(&plan),
        vec![(1, 0, true, false), (2, 1, true, false), (3, 2, false, false)]
    );
    assert_eq!(plan.newly_published, vec![TaskId::new(1), TaskId::new(2)]);
}

#[test]
fn already_published_tasks_count_against_window() {
    let runtime = FakeTaskRuntime::new();
    let mut cache = PublishedTaskCache::new();
    cache.mark(TaskId::new(3));

    let plan = publisher(&runtime, 2).plan(&john_chain(&[1, 2, 3]), &cache);

    assert_eq!(
        flags(&plan),
        vec![(1, 0, true, false), (2, 1, false, false), (3, 2, true, false)]
    );
    assert_eq!(plan.newly_published, vec![TaskId::new(1)]);
}

#[test]
fn full_window_publishes_nothing_new() {
    let runtime = FakeTaskRuntime::new();
    let mut cache = PublishedTaskCache::new();
    cache.extend([TaskId::new(2), TaskId::new(3)]);

    let plan = publisher(&runtime, 2).plan(&john_chain(&[1, 2, 3, 4]), &cache);

    assert!(plan.newly_published.is_empty());
    assert_eq!(plan.results.iter().filter(|r| r.parameters.published).count(), 2);
}

#[test]
fn window_applies_per_user() {
    let runtime = FakeTaskRuntime::new();
    let mut solution = solution_with_users(&["john", "mary"]);
    seed_chain(&mut solution, "john", vec![task(1), task(2)]);
    seed_chain(&mut solution, "mary", vec![task(3), task(4)]);

    let plan = publisher(&runtime, 1).plan(&solution, &PublishedTaskCache::new());

    assert_eq!(plan.newly_published, vec![TaskId::new(1), TaskId::new(3)]);
    let mary: Vec<_> =
        plan.results.iter().filter(|r| r.parameters.assigned_user == "mary").map(|r| r.parameters.index).collect();
    assert_eq!(mary, vec![0, 1]);
}

#[test]
fn placeholder_is_skipped_not_counted() {
    let runtime = FakeTaskRuntime::new();
    let mut solution = solution_with_users(&[]);
    let mut placeholder = Task::placeholder();
    placeholder.pinned = true;
    seed_chain(&mut solution, FALLBACK_USER_ID, vec![placeholder, task(7), task(8)]);

    let plan = publisher(&runtime, 1).plan(&solution, &PublishedTaskCache::new());

    assert_eq!(flags(&plan), vec![(7, 0, true, false), (8, 1, false, false)]);
}

#[test]
fn pinned_flag_is_carried_and_pin_on_publish_pins() {
    let runtime = FakeTaskRuntime::new();
    let mut solution = solution_with_users(&["john"]);
    let mut pinned = task(1);
    pinned.pinned = true;
    seed_chain(&mut solution, "john", vec![pinned, task(2), task(3)]);

    let config = PlannerConfig::default().publish_window(2).pin_on_publish(true);
    let publisher = SolutionPublisher::new(Arc::new(runtime), &config);
    let plan = publisher.plan(&solution, &PublishedTaskCache::new());

    assert_eq!(
        flags(&plan),
        vec![(1, 0, true, true), (2, 1, true, true), (3, 2, false, false)]
    );
}

#[tokio::test]
async fn publish_applies_results_as_acting_user() {
    let runtime = FakeTaskRuntime::with_tasks(vec![
        TaskRecord::new(1, "task-1", TaskStatus::Ready),
        TaskRecord::new(2, "task-2", TaskStatus::Ready),
    ]);
    let job = PublishJob { solution: john_chain(&[1, 2]), published: PublishedTaskCache::new() };

    let outcome = publisher(&runtime, 1).publish(job).await;

    assert_eq!(outcome.result.unwrap(), 2);
    assert_eq!(outcome.newly_published, vec![TaskId::new(1)]);
    let applied = runtime.applied();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].acting_user, "planner-bot");
    let tasks = runtime.tasks();
    assert_eq!(tasks[0].status, TaskStatus::Reserved);
    assert_eq!(tasks[0].actual_owner.as_ref().map(|u| u.as_str()), Some("john"));
    assert_eq!(tasks[1].status, TaskStatus::Ready);
}

#[tokio::test]
async fn failed_publish_reports_nothing_published() {
    let runtime = FakeTaskRuntime::new();
    runtime.fail_applies(Some("boom"));
    let job = PublishJob { solution: john_chain(&[1]), published: PublishedTaskCache::new() };

    let outcome = publisher(&runtime, 4).publish(job).await;

    assert!(matches!(outcome.result, Err(PublishError::Runtime(RuntimeClientError::Apply(_)))));
    assert!(outcome.newly_published.is_empty());
}

#[tokio::test]
async fn run_loop_publishes_jobs_in_order_until_cancelled() {
    let runtime = FakeTaskRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let seen: Arc<Mutex<Vec<Vec<TaskId>>>> = Arc::default();

    let handle = {
        let seen = Arc::clone(&seen);
        let publisher = publisher(&runtime, 1);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            publisher
                .run(rx, cancel, move |outcome: PublishOutcome| seen.lock().push(outcome.newly_published))
                .await
        })
    };

    tx.send(PublishJob { solution: john_chain(&[1, 2]), published: PublishedTaskCache::new() }).unwrap();
    tx.send(PublishJob { solution: john_chain(&[2, 1]), published: PublishedTaskCache::new() }).unwrap();
    runtime.wait_for_applied(2).await;

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(*seen.lock(), vec![vec![TaskId::new(1)], vec![TaskId::new(2)]]);
}

#[tokio::test]
async fn run_loop_stops_when_senders_drop() {
    let runtime = FakeTaskRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel::<PublishJob>();
    drop(tx);
    publisher(&runtime, 1).run(rx, CancellationToken::new(), |_: PublishOutcome| {}).await;
    assert!(runtime.applied().is_empty());
}

proptest::proptest! {
    #[test]
    fn window_bound_holds(len in 0usize..12, window in 1usize..6, seeded in proptest::collection::vec(proptest::bool::ANY, 12)) {
        let ids: Vec<i64> = (1..=len as i64).collect();
        let mut cache = PublishedTaskCache::new();
        for id in &ids {
            if seeded[(*id - 1) as usize] {
                cache.mark(TaskId::new(*id));
            }
        }
        let already = cache.len();

        let runtime = FakeTaskRuntime::new();
        let plan = publisher(&runtime, window).plan(&john_chain(&ids), &cache);

        let published: Vec<i64> = plan
            .results
            .iter()
            .filter(|r| r.parameters.published)
            .map(|r| r.task_id.get())
            .collect();
        // Previously published tasks stay published.
        for id in cache.iter() {
            proptest::prop_assert!(published.contains(&id.get()));
        }
        proptest::prop_assert_eq!(published.len(), already.max(window.min(len)));
        // New ones are the first unpublished tasks in chain order.
        let expected_new: Vec<TaskId> = ids
            .iter()
            .map(|id| TaskId::new(*id))
            .filter(|id| !cache.is_published(*id))
            .take(window.saturating_sub(already))
            .collect();
        proptest::prop_assert_eq!(plan.newly_published, expected_new);
    }
}
