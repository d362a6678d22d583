// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-state synchronizer.
//!
//! Polls the task runtime on a fixed period. Until the optimizer runs, each
//! cycle tries to bootstrap it from a cold build; afterwards each cycle hands
//! the fetched records over for diffing. Failed cycles are skipped and the
//! next period is the retry.

use crate::planner::PlannerError;
use std::sync::Arc;
use std::time::Duration;
use ta_adapters::{DirectoryUser, TaskRecord, TaskRuntimeClient, TaskStatus, UserDirectory};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Receives what the synchronizer fetched.
pub trait SyncHandler: Send + Sync + 'static {
    /// Whether the optimizer is already running.
    fn is_started(&self) -> bool;

    /// Build the initial solution and start the optimizer. Returns `false`
    /// when there was nothing worth starting on.
    fn bootstrap(&self, records: Vec<TaskRecord>, users: Vec<DirectoryUser>) -> Result<bool, PlannerError>;

    /// Diff against the current solution and submit the changes. Returns the
    /// number of mutations submitted.
    fn refresh(&self, records: Vec<TaskRecord>) -> Result<usize, PlannerError>;
}

/// Result of one synchronization cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Started,
    /// Bootstrap found no task; retried next period.
    Waiting,
    Refreshed(usize),
    Skipped,
}

pub struct Synchronizer<R, D> {
    client: Arc<R>,
    directory: Arc<D>,
    period: Duration,
    page_size: u32,
}

impl<R: TaskRuntimeClient, D: UserDirectory> Synchronizer<R, D> {
    pub fn new(client: Arc<R>, directory: Arc<D>, period: Duration, page_size: u32) -> Self {
        Self { client, directory, period, page_size }
    }

    pub async fn run<H: SyncHandler + ?Sized>(self, handler: Arc<H>, cancel: CancellationToken) {
        info!(period_ms = self.period.as_millis() as u64, "synchronizer started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.period) => {}
            }
            let outcome = self.sync_once(handler.as_ref()).await;
            debug!(?outcome, "synchronization cycle done");
        }
        debug!("synchronizer stopped");
    }

    /// Run one cycle against `handler`.
    pub async fn sync_once<H: SyncHandler + ?Sized>(&self, handler: &H) -> SyncOutcome {
        let records = match self.client.fetch_tasks(&TaskStatus::PLANNABLE, 0, self.page_size).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to fetch tasks, skipping cycle");
                return SyncOutcome::Skipped;
            }
        };

        if handler.is_started() {
            return match handler.refresh(records) {
                Ok(changes) => SyncOutcome::Refreshed(changes),
                Err(e) => {
                    warn!(error = %e, "refresh failed, skipping cycle");
                    SyncOutcome::Skipped
                }
            };
        }

        let users = match self.directory.find_all_users().await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "failed to load users, skipping cycle");
                return SyncOutcome::Skipped;
            }
        };
        match handler.bootstrap(records, users) {
            Ok(true) => SyncOutcome::Started,
            Ok(false) => {
                debug!("no tasks to plan yet");
                SyncOutcome::Waiting
            }
            Err(e) => {
                warn!(error = %e, "bootstrap failed, skipping cycle");
                SyncOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod tests;
