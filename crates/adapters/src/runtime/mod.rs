// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task runtime client: where tasks are read from and plans are written to.

mod record;

pub use record::{
    PlanningParameters, PlanningResult, TaskRecord, TaskStatus, ASSIGNED_USER_KEY, ORDER_KEY,
    PINNED_KEY, PUBLISHED_KEY,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from task runtime calls
#[derive(Debug, Clone, Error)]
pub enum RuntimeClientError {
    #[error("task query failed: {0}")]
    Fetch(String),
    #[error("applying planning failed: {0}")]
    Apply(String),
    #[error("task runtime unavailable: {0}")]
    Unavailable(String),
}

/// Access to the external process-execution runtime.
#[async_trait]
pub trait TaskRuntimeClient: Send + Sync + 'static {
    /// One page of tasks whose status is in `statuses`.
    async fn fetch_tasks(
        &self,
        statuses: &[TaskStatus],
        page: u32,
        page_size: u32,
    ) -> Result<Vec<TaskRecord>, RuntimeClientError>;

    /// Persist planning parameters and delegate tasks on behalf of `acting_user`.
    async fn apply_planning(
        &self,
        results: Vec<PlanningResult>,
        acting_user: &str,
    ) -> Result<(), RuntimeClientError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{PlanningResult, RuntimeClientError, TaskRecord, TaskRuntimeClient, TaskStatus};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Recorded `fetch_tasks` call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FetchCall {
        pub statuses: Vec<TaskStatus>,
        pub page: u32,
        pub page_size: u32,
    }

    /// Recorded `apply_planning` call
    #[derive(Debug, Clone)]
    pub struct ApplyCall {
        pub results: Vec<PlanningResult>,
        pub acting_user: String,
    }

    #[derive(Default)]
    struct FakeRuntimeState {
        tasks: Vec<TaskRecord>,
        fetches: Vec<FetchCall>,
        applies_started: usize,
        applies: Vec<ApplyCall>,
        fetch_failures: usize,
        apply_failure: Option<String>,
        gate: Option<Arc<Semaphore>>,
    }

    /// In-memory task runtime.
    ///
    /// Applying a published placement delegates the task the way the real
    /// runtime does: a ready task becomes reserved by the planned owner.
    #[derive(Clone, Default)]
    pub struct FakeTaskRuntime {
        inner: Arc<Mutex<FakeRuntimeState>>,
    }

    impl FakeTaskRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_tasks(tasks: Vec<TaskRecord>) -> Self {
            let fake = Self::new();
            fake.set_tasks(tasks);
            fake
        }

        pub fn set_tasks(&self, tasks: Vec<TaskRecord>) {
            self.inner.lock().tasks = tasks;
        }

        /// Insert or replace a task by id.
        pub fn upsert_task(&self, task: TaskRecord) {
            let mut inner = self.inner.lock();
            match inner.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
                Some(existing) => *existing = task,
                None => inner.tasks.push(task),
            }
        }

        pub fn tasks(&self) -> Vec<TaskRecord> {
            self.inner.lock().tasks.clone()
        }

        pub fn fetch_calls(&self) -> Vec<FetchCall> {
            self.inner.lock().fetches.clone()
        }

        /// Completed `apply_planning` calls, oldest first
        pub fn applied(&self) -> Vec<ApplyCall> {
            self.inner.lock().applies.clone()
        }

        /// `apply_planning` calls that have been entered, including held ones
        pub fn applies_started(&self) -> usize {
            self.inner.lock().applies_started
        }

        /// Fail the next `n` fetches.
        pub fn fail_fetches(&self, n: usize) {
            self.inner.lock().fetch_failures = n;
        }

        /// Fail every apply until cleared with `None`.
        pub fn fail_applies(&self, error: Option<&str>) {
            self.inner.lock().apply_failure = error.map(str::to_string);
        }

        /// Make each `apply_planning` wait for [`FakeTaskRuntime::release_apply`].
        pub fn hold_applies(&self) {
            self.inner.lock().gate = Some(Arc::new(Semaphore::new(0)));
        }

        pub fn release_apply(&self) {
            if let Some(gate) = self.inner.lock().gate.as_ref() {
                gate.add_permits(1);
            }
        }

        /// Poll until `n` applies have been entered.
        pub async fn wait_for_applies_started(&self, n: usize) {
            while self.applies_started() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }

        /// Poll until `n` applies have completed.
        pub async fn wait_for_applied(&self, n: usize) {
            while self.applied().len() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }
    }

    #[async_trait]
    impl TaskRuntimeClient for FakeTaskRuntime {
        async fn fetch_tasks(
            &self,
            statuses: &[TaskStatus],
            page: u32,
            page_size: u32,
        ) -> Result<Vec<TaskRecord>, RuntimeClientError> {
            let mut inner = self.inner.lock();
            inner.fetches.push(FetchCall { statuses: statuses.to_vec(), page, page_size });
            if inner.fetch_failures > 0 {
                inner.fetch_failures -= 1;
                return Err(RuntimeClientError::Fetch("injected failure".to_string()));
            }
            Ok(inner
                .tasks
                .iter()
                .filter(|t| statuses.contains(&t.status))
                .skip(page as usize * page_size as usize)
                .take(page_size as usize)
                .cloned()
                .collect())
        }

        async fn apply_planning(
            &self,
            results: Vec<PlanningResult>,
            acting_user: &str,
        ) -> Result<(), RuntimeClientError> {
            let gate = {
                let mut inner = self.inner.lock();
                inner.applies_started += 1;
                inner.gate.clone()
            };
            if let Some(gate) = gate {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|e| RuntimeClientError::Unavailable(e.to_string()))?;
                permit.forget();
            }

            let mut inner = self.inner.lock();
            if let Some(error) = inner.apply_failure.clone() {
                return Err(RuntimeClientError::Apply(error));
            }
            for result in &results {
                let Some(task) = inner.tasks.iter_mut().find(|t| t.task_id == result.task_id)
                else {
                    continue;
                };
                let params = &result.parameters;
                if params.published
                    && matches!(task.status, TaskStatus::Ready | TaskStatus::Reserved)
                {
                    task.status = TaskStatus::Reserved;
                    task.actual_owner = Some(params.assigned_user.clone());
                }
                task.planning_parameters = Some(params.clone());
            }
            inner.applies.push(ApplyCall { results, acting_user: acting_user.to_string() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ApplyCall, FakeTaskRuntime, FetchCall};

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
