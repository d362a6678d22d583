// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural edits applied to the optimizer's working copy.
//!
//! These are the only way external changes reach a running search. Each one
//! goes through the chain operations on [`Solution`], so links and times stay
//! consistent after every step.

use crate::chain::ChainError;
use crate::id::{TaskId, UserId};
use crate::solution::Solution;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("a task with the given identifier id: {0} already exists")]
    DuplicateTask(TaskId),
    #[error("expected user {0} was not found in the working solution")]
    UnknownUser(UserId),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert as unassigned.
    AddTask { task: Task },
    /// Pin to `user` after the leading pinned run, creating the task if absent.
    AssignTask { task: Task, user: UserId },
    /// Unlink and drop; no-op when absent.
    RemoveTask { task_id: TaskId },
    /// Unpin and return to optimizer-controlled placement; no-op when absent.
    ReleaseTask { task_id: TaskId },
}

impl Mutation {
    pub fn add(task: Task) -> Self {
        Mutation::AddTask { task }
    }

    pub fn assign(task: Task, user: impl Into<UserId>) -> Self {
        Mutation::AssignTask { task, user: user.into() }
    }

    pub fn remove(task_id: TaskId) -> Self {
        Mutation::RemoveTask { task_id }
    }

    pub fn release(task_id: TaskId) -> Self {
        Mutation::ReleaseTask { task_id }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            Mutation::AddTask { task } | Mutation::AssignTask { task, .. } => task.id,
            Mutation::RemoveTask { task_id } | Mutation::ReleaseTask { task_id } => *task_id,
        }
    }

    pub fn apply(&self, solution: &mut Solution) -> Result<(), MutationError> {
        match self {
            Mutation::AddTask { task } => {
                if solution.contains_task(task.id) {
                    return Err(MutationError::DuplicateTask(task.id));
                }
                solution.add_task(task.clone())?;
            }
            Mutation::AssignTask { task, user } => {
                if solution.user(user).is_none() {
                    return Err(MutationError::UnknownUser(user.clone()));
                }
                if solution.contains_task(task.id) {
                    solution.unlink(task.id)?;
                } else {
                    solution.add_task(task.clone())?;
                }
                let position = solution.pinned_run_end(user)?;
                solution.link_after(&position, task.id)?;
                solution.set_pinned(task.id, true)?;
            }
            Mutation::RemoveTask { task_id } => {
                solution.remove_task(*task_id)?;
            }
            Mutation::ReleaseTask { task_id } => {
                if solution.contains_task(*task_id) {
                    solution.unlink(*task_id)?;
                    solution.set_pinned(*task_id, false)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::AddTask { task } => write!(f, "add task {}", task.id),
            Mutation::AssignTask { task, user } => write!(f, "assign task {} to {}", task.id, user),
            Mutation::RemoveTask { task_id } => write!(f, "remove task {}", task_id),
            Mutation::ReleaseTask { task_id } => write!(f, "release task {}", task_id),
        }
    }
}

/// Apply a batch in order, stopping at the first failure.
pub fn apply_all(solution: &mut Solution, mutations: &[Mutation]) -> Result<(), MutationError> {
    mutations.iter().try_for_each(|m| m.apply(solution))
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
