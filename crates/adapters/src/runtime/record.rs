// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records exchanged with the task runtime.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ta_core::{OwnerRef, TaskId, UserId};

/// Key under which the planned owner is persisted on a task.
pub const ASSIGNED_USER_KEY: &str = "planning_param_assigned_user";
/// Key for the position in the owner's chain.
pub const ORDER_KEY: &str = "planning_param_order";
pub const PINNED_KEY: &str = "planning_param_pinned";
pub const PUBLISHED_KEY: &str = "planning_param_published";

/// Lifecycle state of a task in the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Created,
    Ready,
    Reserved,
    InProgress,
    Suspended,
    Completed,
    Failed,
    Error,
    Exited,
    Obsolete,
}

ta_core::simple_display! {
    TaskStatus {
        Created => "Created",
        Ready => "Ready",
        Reserved => "Reserved",
        InProgress => "InProgress",
        Suspended => "Suspended",
        Completed => "Completed",
        Failed => "Failed",
        Error => "Error",
        Exited => "Exited",
        Obsolete => "Obsolete",
    }
}

impl TaskStatus {
    /// Statuses the planner keeps track of.
    pub const PLANNABLE: [TaskStatus; 4] =
        [TaskStatus::Ready, TaskStatus::Reserved, TaskStatus::InProgress, TaskStatus::Suspended];

    /// No further work will happen on the task.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Failed
                | TaskStatus::Error
                | TaskStatus::Exited
                | TaskStatus::Obsolete
        )
    }
}

/// Placement persisted on a task by a previous publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningParameters {
    pub assigned_user: UserId,
    /// Position in the assigned user's chain, `-1` when unknown.
    pub index: i32,
    pub pinned: bool,
    pub published: bool,
}

impl PlanningParameters {
    pub fn new(assigned_user: impl Into<UserId>, index: i32) -> Self {
        Self { assigned_user: assigned_user.into(), index, pinned: false, published: false }
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    /// Flat key/value form stored next to the task's data.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(ASSIGNED_USER_KEY.to_string(), Value::from(self.assigned_user.as_str()));
        map.insert(ORDER_KEY.to_string(), Value::from(self.index));
        map.insert(PINNED_KEY.to_string(), Value::from(self.pinned));
        map.insert(PUBLISHED_KEY.to_string(), Value::from(self.published));
        map
    }

    /// Decode from task data. `None` when no assigned user is recorded.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let assigned_user = map.get(ASSIGNED_USER_KEY)?.as_str().filter(|s| !s.is_empty())?;
        let index = map
            .get(ORDER_KEY)
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(-1);
        Some(Self {
            assigned_user: UserId::new(assigned_user),
            index,
            pinned: flag(map.get(PINNED_KEY)),
            published: flag(map.get(PUBLISHED_KEY)),
        })
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// A task as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub process_instance_id: i64,
    pub process_id: String,
    pub container_id: String,
    pub name: String,
    /// Unvalidated; the planner rejects values outside 0..=10.
    pub priority: i32,
    pub status: TaskStatus,
    #[serde(default)]
    pub actual_owner: Option<UserId>,
    #[serde(default)]
    pub potential_owners: Vec<OwnerRef>,
    #[serde(default)]
    pub input_data: Map<String, Value>,
    #[serde(default)]
    pub planning_parameters: Option<PlanningParameters>,
}

impl TaskRecord {
    pub fn new(task_id: i64, name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: TaskId::new(task_id),
            process_instance_id: 0,
            process_id: String::new(),
            container_id: String::new(),
            name: name.into(),
            priority: 0,
            status,
            actual_owner: None,
            potential_owners: Vec::new(),
            input_data: Map::new(),
            planning_parameters: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<UserId>) -> Self {
        self.actual_owner = Some(owner.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_potential_owners(mut self, owners: impl IntoIterator<Item = OwnerRef>) -> Self {
        self.potential_owners = owners.into_iter().collect();
        self
    }

    pub fn with_planning(mut self, params: PlanningParameters) -> Self {
        self.planning_parameters = Some(params);
        self
    }

    pub fn with_process(mut self, container_id: impl Into<String>, process_instance_id: i64) -> Self {
        self.container_id = container_id.into();
        self.process_instance_id = process_instance_id;
        self
    }
}

/// Placement to persist for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningResult {
    pub container_id: String,
    pub task_id: TaskId,
    pub process_instance_id: i64,
    pub parameters: PlanningParameters,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
