// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::mpsc;
use ta_core::test_support::{owned_task, seed_chain, task_with_duration};
use ta_core::{OwnerRef, User, FALLBACK_USER_ID};

fn team() -> Solution {
    Solution::with_users([
        User::new("john").with_groups(["HR"]),
        User::new("mary").with_groups(["HR"]),
        User::fallback(),
    ])
}

#[test]
fn places_on_least_loaded_eligible_user() {
    let mut solution = team();
    let mut busy = owned_task(1, vec![OwnerRef::group("HR")]);
    busy.duration = 5;
    seed_chain(&mut solution, "john", vec![busy]);
    solution.add_task(owned_task(2, vec![OwnerRef::group("HR")])).unwrap();

    assert_eq!(place_unassigned(&mut solution), 1);
    assert_eq!(solution.assigned_user(TaskId::new(2)).map(UserId::as_str), Some("mary"));
    assert!(solution.assignment_violations().is_empty());
}

#[test]
fn direct_owner_is_preferred_over_load() {
    let mut solution = team();
    let mut busy = owned_task(1, vec![OwnerRef::group("HR")]);
    busy.duration = 5;
    seed_chain(&mut solution, "mary", vec![busy]);
    solution.add_task(owned_task(2, vec![OwnerRef::group("HR"), OwnerRef::user("mary")])).unwrap();
    solution.add_task(owned_task(3, vec![OwnerRef::group("HR")])).unwrap();

    assert_eq!(place_unassigned(&mut solution), 2);
    assert_eq!(solution.chain_ids("mary"), vec![TaskId::new(1), TaskId::new(2)]);
    assert_eq!(solution.chain_ids("john"), vec![TaskId::new(3)]);
}

#[test]
fn tasks_without_eligible_user_go_to_fallback() {
    let mut solution = team();
    solution.add_task(owned_task(1, vec![OwnerRef::user("ghost")])).unwrap();
    solution.add_task(owned_task(2, vec![])).unwrap();

    assert_eq!(place_unassigned(&mut solution), 2);
    assert_eq!(solution.chain_ids(FALLBACK_USER_ID), vec![TaskId::new(1), TaskId::new(2)]);
    solution.validate().unwrap();
}

#[test]
fn placed_tasks_never_move() {
    let mut solution = team();
    let mut pinned = owned_task(1, vec![OwnerRef::user("mary")]);
    pinned.pinned = true;
    seed_chain(&mut solution, "john", vec![pinned]);

    assert_eq!(place_unassigned(&mut solution), 0);
    assert_eq!(solution.chain_ids("john"), vec![TaskId::new(1)]);
}

fn spawn_solver(
    optimizer: Arc<GreedyOptimizer>,
    initial: Solution,
) -> (std::thread::JoinHandle<()>, mpsc::Receiver<BestSolution>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let listener: BestSolutionListener = Arc::new(move |event: BestSolution| {
        let _ = tx.lock().send(event);
    });
    let handle = std::thread::spawn(move || optimizer.solve(initial, listener));
    (handle, rx)
}

#[test]
fn solve_reports_initial_and_mutated_solutions() {
    let optimizer = Arc::new(GreedyOptimizer::new(Duration::from_millis(10)));
    let mut initial = team();
    initial.add_task(owned_task(1, vec![OwnerRef::user("john")])).unwrap();
    let (handle, rx) = spawn_solver(Arc::clone(&optimizer), initial);

    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(first.is_publishable());
    assert_eq!(first.solution.chain_ids("john"), vec![TaskId::new(1)]);

    optimizer.submit_mutations(vec![Mutation::assign(task_with_duration(2, 1), "mary")]);
    let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(second.all_mutations_processed);
    assert_eq!(second.solution.chain_ids("mary"), vec![TaskId::new(2)]);
    assert!(second.solution.task(TaskId::new(2)).unwrap().pinned);

    optimizer.terminate_early();
    handle.join().unwrap();
}

#[test]
fn rejected_mutation_does_not_stop_the_batch() {
    let optimizer = Arc::new(GreedyOptimizer::new(Duration::from_millis(10)));
    let (handle, rx) = spawn_solver(Arc::clone(&optimizer), team());
    rx.recv_timeout(Duration::from_secs(5)).unwrap();

    optimizer.submit_mutations(vec![
        Mutation::assign(task_with_duration(1, 1), "ghost"),
        Mutation::add(owned_task(2, vec![OwnerRef::user("john")])),
    ]);
    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!event.solution.contains_task(TaskId::new(1)));
    assert_eq!(event.solution.chain_ids("john"), vec![TaskId::new(2)]);

    optimizer.terminate_early();
    handle.join().unwrap();
}

#[test]
fn terminate_before_solve_returns_immediately() {
    let optimizer = Arc::new(GreedyOptimizer::new(Duration::from_secs(60)));
    optimizer.terminate_early();
    let (handle, rx) = spawn_solver(optimizer, team());
    handle.join().unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn factory_builds_optimizer() {
    assert!(GreedyOptimizerFactory::new(Duration::from_millis(5)).create().is_ok());
}
