// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warm resync: the mutations that bring a working solution in line with
//! freshly fetched runtime state.

use super::{task_from_record, AssemblyError};
use crate::cache::PublishedTaskCache;
use indexmap::IndexSet;
use std::collections::HashSet;
use ta_adapters::{TaskRecord, TaskStatus};
use ta_core::{Mutation, Solution, TaskId};
use tracing::{debug, warn};

/// Compute the mutations for `records` against `solution`.
///
/// Tasks that match their internal placement produce nothing. Tasks owned
/// externally are marked in `published`; released ones are forgotten.
/// Records in a terminal status count as absent, so their tasks are removed.
/// Only the first record for a task id is considered.
pub fn diff_solution(
    solution: &Solution,
    records: &[TaskRecord],
    published: &mut PublishedTaskCache,
) -> Result<Vec<Mutation>, AssemblyError> {
    let mut remaining: IndexSet<TaskId> =
        solution.tasks().map(|t| t.id).filter(|id| !id.is_placeholder()).collect();
    let mut seen = HashSet::new();
    let mut mutations = Vec::new();

    for record in records {
        let id = record.task_id;
        if !seen.insert(id) {
            debug!(task_id = %id, "ignoring duplicate task record");
            continue;
        }
        if record.status.is_terminal() {
            continue;
        }
        let known = if remaining.shift_remove(&id) { solution.task(id) } else { None };

        match (record.status, &record.actual_owner) {
            (TaskStatus::Ready, _) => match known {
                None => mutations.push(Mutation::add(task_from_record(record)?)),
                // A claimed or exposed task showing up as ready again was
                // released externally.
                Some(task) if task.pinned || published.is_published(id) => {
                    published.forget(id);
                    mutations.push(Mutation::release(id));
                }
                Some(_) => {}
            },
            (TaskStatus::Reserved | TaskStatus::InProgress | TaskStatus::Suspended, Some(owner)) => {
                published.mark(id);
                if solution.user(owner).is_none() {
                    warn!(task_id = %id, owner = %owner, "task owner is not a known user");
                    match known {
                        None => mutations.push(Mutation::add(task_from_record(record)?)),
                        Some(task) if !task.is_unassigned() => {
                            mutations.push(Mutation::release(id))
                        }
                        Some(_) => {}
                    }
                    continue;
                }
                match known {
                    Some(_) if solution.assigned_user(id) == Some(owner) => {}
                    Some(task) => mutations.push(Mutation::assign(task.detached(), owner.clone())),
                    None => mutations.push(Mutation::assign(task_from_record(record)?, owner.clone())),
                }
            }
            (status, None) => {
                debug!(task_id = %id, status = %status, "ignoring ownerless task");
            }
            (status, Some(_)) => {
                debug!(task_id = %id, status = %status, "ignoring task in unplanned status");
            }
        }
    }

    mutations.extend(remaining.into_iter().map(Mutation::remove));
    if !mutations.is_empty() {
        debug!(mutations = mutations.len(), "computed solution changes");
    }
    Ok(mutations)
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
