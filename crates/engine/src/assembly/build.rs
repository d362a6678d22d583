// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cold build of a solution from the runtime's task list and the directory.

use super::{task_from_record, AssemblyError};
use crate::cache::PublishedTaskCache;
use indexmap::IndexMap;
use ta_adapters::{DirectoryUser, TaskRecord, TaskStatus};
use ta_core::{Anchor, Solution, Task, TaskId, User, UserId, FALLBACK_USER_ID};
use tracing::{debug, warn};

/// A task waiting to be linked into its owner's chain.
#[derive(Debug, Clone)]
pub struct OrderedTask {
    pub task: Task,
    /// Recorded chain position, negative when unknown.
    pub index: i32,
    pub pinned: bool,
}

/// Insert `item` so that pinned tasks precede unpinned ones and, within each
/// group, known indexes come first in ascending order. Tasks without an index
/// go after the existing tasks of their group.
pub fn insert_in_order(list: &mut Vec<OrderedTask>, item: OrderedTask) {
    let position = list
        .iter()
        .position(|current| match (item.pinned, current.pinned) {
            (true, false) => true,
            (false, true) => false,
            _ => item.index >= 0 && (current.index < 0 || item.index < current.index),
        })
        .unwrap_or(list.len());
    list.insert(position, item);
}

/// Build the initial solution.
///
/// Owned tasks keep their recorded index when the recorded owner still
/// matches. Published tasks are pinned and marked in `published`. Tasks owned
/// by a worker missing from the directory are left unassigned.
pub fn build_solution(
    records: &[TaskRecord],
    directory: &[DirectoryUser],
    published: &mut PublishedTaskCache,
) -> Result<Solution, AssemblyError> {
    let mut solution = Solution::with_users(directory.iter().map(User::from));
    solution.add_user(User::fallback());

    let mut chains: IndexMap<UserId, Vec<OrderedTask>> =
        solution.users().map(|u| (u.id.clone(), Vec::new())).collect();
    let mut unassigned = Vec::new();

    for record in records {
        match record.status {
            TaskStatus::Ready => unassigned.push(task_from_record(record)?),
            TaskStatus::Reserved | TaskStatus::InProgress | TaskStatus::Suspended => {
                let Some(owner) = &record.actual_owner else {
                    debug!(task_id = %record.task_id, status = %record.status, "skipping ownerless task");
                    continue;
                };
                let task = task_from_record(record)?;
                let in_progress = record.status == TaskStatus::InProgress;
                let (is_published, pinned, index) = match &record.planning_parameters {
                    Some(params) => {
                        let is_published = in_progress || params.published;
                        let index = if params.assigned_user == *owner { params.index } else { -1 };
                        (is_published, is_published || params.pinned, index)
                    }
                    None => (in_progress, in_progress, -1),
                };
                if is_published {
                    published.mark(task.id);
                }
                match chains.get_mut(owner) {
                    Some(list) => insert_in_order(list, OrderedTask { task, index, pinned }),
                    None => {
                        warn!(task_id = %task.id, owner = %owner, "owner not in directory, leaving task unassigned");
                        unassigned.push(task);
                    }
                }
            }
            _ => debug!(task_id = %record.task_id, status = %record.status, "skipping task"),
        }
    }

    let mut placeholder = Task::placeholder();
    placeholder.pinned = true;
    solution.add_task(placeholder)?;
    solution.link_after(&Anchor::User(UserId::new(FALLBACK_USER_ID)), TaskId::PLACEHOLDER)?;

    for (user, list) in chains {
        for OrderedTask { mut task, pinned, .. } in list {
            task.pinned = pinned;
            let id = task.id;
            let tail = solution.chain_tail(&user);
            solution.add_task(task)?;
            solution.link_after(&tail, id)?;
        }
    }
    for task in unassigned {
        solution.add_task(task)?;
    }

    debug!(
        users = solution.users().count(),
        tasks = solution.task_count(),
        unassigned = solution.unassigned().count(),
        "built solution"
    );
    Ok(solution)
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
