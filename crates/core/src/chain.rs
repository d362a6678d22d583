// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain positions and the errors raised when chain links disagree.

use crate::id::{TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Anything a task can be linked after: a worker (chain head) or another task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Anchor {
    User(UserId),
    Task(TaskId),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::User(id) => write!(f, "user:{}", id),
            Anchor::Task(id) => write!(f, "task:{}", id),
        }
    }
}

impl From<UserId> for Anchor {
    fn from(id: UserId) -> Self {
        Anchor::User(id)
    }
}

impl From<TaskId> for Anchor {
    fn from(id: TaskId) -> Self {
        Anchor::Task(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("task {0} is not in the solution")]
    UnknownTask(TaskId),
    #[error("user {0} is not in the solution")]
    UnknownUser(UserId),
    #[error("a task with id {0} already exists")]
    DuplicateTask(TaskId),
    #[error("task {0} is already linked, unlink it first")]
    AlreadyLinked(TaskId),
    #[error("task {0} cannot be linked after itself")]
    SelfLink(TaskId),
    #[error("cannot link after task {0}, it is not in any chain")]
    DetachedAnchor(TaskId),
    #[error("chain of user {user} revisits task {task}")]
    Cycle { user: UserId, task: TaskId },
    #[error("task {task} records predecessor {recorded:?} but is linked from {actual}")]
    BrokenBackLink { task: TaskId, recorded: Option<Anchor>, actual: Anchor },
    #[error("task {0} is linked but not reachable from any user")]
    Orphaned(TaskId),
    #[error("task {task} has stale times: expected start {expected_start}, found {found:?}")]
    StaleTimes { task: TaskId, expected_start: u32, found: Option<u32> },
}
