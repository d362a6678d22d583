// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items placed in worker chains.

use crate::chain::Anchor;
use crate::id::{TaskId, UserId};
use crate::owner::OwnerRef;
use crate::priority::Priority;
use crate::user::{User, FALLBACK_USER_ID};
use serde::{Deserialize, Serialize};

/// Duration in minutes given to tasks when the runtime does not report one.
pub const DEFAULT_DURATION: u32 = 1;

/// Name of the placeholder task parked on the fallback user.
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// A task as seen by the planner.
///
/// `previous`/`next` are the chain links. They are only written by the chain
/// operations on [`Solution`](crate::Solution), as are `start_time` and
/// `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    /// Minutes.
    pub duration: u32,
    pub process_instance_id: i64,
    pub process_id: String,
    pub container_id: String,
    #[serde(default)]
    pub potential_owners: Vec<OwnerRef>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u32>,
}

impl Task {
    /// A detached, unpinned task.
    pub fn new(id: TaskId, name: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            duration: DEFAULT_DURATION,
            process_instance_id: 0,
            process_id: String::new(),
            container_id: String::new(),
            potential_owners: Vec::new(),
            pinned: false,
            payload: serde_json::Map::new(),
            previous: None,
            next: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Filler task that keeps the fallback user's chain non-empty.
    pub fn placeholder() -> Self {
        let mut task = Self::new(TaskId::PLACEHOLDER, PLACEHOLDER_NAME, Priority::LOWEST);
        task.potential_owners.push(OwnerRef::user(FALLBACK_USER_ID));
        task
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_placeholder()
    }

    /// Not linked into any chain.
    pub fn is_unassigned(&self) -> bool {
        self.previous.is_none()
    }

    /// Direct owner or member of an owning group.
    pub fn is_eligible(&self, user: &User) -> bool {
        self.potential_owners.iter().any(|owner| owner.matches(user))
    }

    pub fn has_direct_owner(&self, user: &UserId) -> bool {
        self.potential_owners.iter().any(|owner| matches!(owner, OwnerRef::User(id) if id == user))
    }

    /// Copy with chain links and computed times cleared.
    pub fn detached(&self) -> Self {
        Self { previous: None, next: None, start_time: None, end_time: None, ..self.clone() }
    }

    pub(crate) fn clear_links(&mut self) {
        self.previous = None;
        self.next = None;
        self.start_time = None;
        self.end_time = None;
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        into {
            name: String = "task",
            process_id: String = "com.example.process",
            container_id: String = "example_1.0.0",
        }
        set {
            id: TaskId = TaskId::new(1),
            priority: Priority = Priority::LOWEST,
            duration: u32 = DEFAULT_DURATION,
            process_instance_id: i64 = 1,
            potential_owners: Vec<OwnerRef> = Vec::new(),
            pinned: bool = false,
        }
        computed {
            payload: serde_json::Map<String, serde_json::Value> = serde_json::Map::new(),
            previous: Option<Anchor> = None,
            next: Option<TaskId> = None,
            start_time: Option<u32> = None,
            end_time: Option<u32> = None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
