// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Anchor, OwnerRef, Priority, Solution, Task, TaskId, User, UserId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for mutation sequences.
pub mod strategies {
    use crate::{Mutation, Task, TaskId, UserId};
    use proptest::prelude::*;

    /// Workers every generated mutation may target.
    pub const USERS: [&str; 3] = ["john", "mary", "katy"];

    pub fn arb_task_id(max: i64) -> impl Strategy<Value = TaskId> {
        (1..=max).prop_map(TaskId::new)
    }

    pub fn arb_user() -> impl Strategy<Value = UserId> {
        prop::sample::select(USERS.to_vec()).prop_map(UserId::new)
    }

    fn arb_task(max: i64) -> impl Strategy<Value = Task> {
        (arb_task_id(max), 1..5u32).prop_map(|(id, duration)| super::task_with_duration(id.get(), duration))
    }

    pub fn arb_mutation(max_task: i64) -> impl Strategy<Value = Mutation> {
        prop_oneof![
            arb_task(max_task).prop_map(Mutation::add),
            (arb_task(max_task), arb_user()).prop_map(|(t, u)| Mutation::assign(t, u)),
            arb_task_id(max_task).prop_map(Mutation::remove),
            arb_task_id(max_task).prop_map(Mutation::release),
        ]
    }

    pub fn arb_mutations(max_task: i64, len: usize) -> impl Strategy<Value = Vec<Mutation>> {
        prop::collection::vec(arb_mutation(max_task), 0..len)
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

/// Unpinned task with default duration and no eligible owners.
pub fn task(id: i64) -> Task {
    Task::builder().id(TaskId::new(id)).name(format!("task-{id}")).build()
}

pub fn task_with_duration(id: i64, duration: u32) -> Task {
    Task::builder().id(TaskId::new(id)).name(format!("task-{id}")).duration(duration).build()
}

pub fn owned_task(id: i64, owners: Vec<OwnerRef>) -> Task {
    Task::builder().id(TaskId::new(id)).name(format!("task-{id}")).potential_owners(owners).build()
}

pub fn prioritized_task(id: i64, priority: i32) -> Task {
    let priority = Priority::new(priority).unwrap_or(Priority::LOWEST);
    Task::builder().id(TaskId::new(id)).name(format!("task-{id}")).priority(priority).build()
}

/// Solution with the named workers plus the fallback user.
pub fn solution_with_users(users: &[&str]) -> Solution {
    let mut solution = Solution::with_users(users.iter().map(|u| User::new(*u)));
    solution.add_user(User::fallback());
    solution
}

/// Append tasks to the end of `user`'s chain in order, keeping their pinned flags.
pub fn seed_chain(solution: &mut Solution, user: &str, tasks: Vec<Task>) {
    let user = UserId::new(user);
    for task in tasks {
        let id = task.id;
        let tail = solution.chain_tail(&user);
        if solution.add_task(task).is_ok() {
            let _ = solution.link_after(&tail, id);
        }
    }
}

pub fn user_anchor(user: &str) -> Anchor {
    Anchor::User(UserId::new(user))
}
