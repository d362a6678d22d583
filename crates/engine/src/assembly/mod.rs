// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Solution assembly: cold builds from runtime records, and warm diffs
//! expressed as mutations.

mod build;
mod diff;

pub use build::{build_solution, insert_in_order, OrderedTask};
pub use diff::diff_solution;

use ta_adapters::TaskRecord;
use ta_core::{ChainError, Priority, PriorityError, Task, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("task {task} has an invalid priority: {source}")]
    InvalidPriority {
        task: TaskId,
        #[source]
        source: PriorityError,
    },
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Planner view of a runtime record: detached and unpinned.
pub fn task_from_record(record: &TaskRecord) -> Result<Task, AssemblyError> {
    let priority = Priority::new(record.priority)
        .map_err(|source| AssemblyError::InvalidPriority { task: record.task_id, source })?;
    let mut task = Task::new(record.task_id, record.name.clone(), priority);
    task.process_instance_id = record.process_instance_id;
    task.process_id = record.process_id.clone();
    task.container_id = record.container_id.clone();
    task.potential_owners = record.potential_owners.clone();
    task.payload = record.input_data.clone();
    Ok(task)
}
