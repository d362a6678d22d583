// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result publisher: pushes chain placements back to the task runtime.
//!
//! Runs one job at a time. The planner guarantees at most one job is handed
//! over while another is in flight, so the loop never queues stale solutions.

use crate::cache::PublishedTaskCache;
use crate::config::PlannerConfig;
use std::sync::Arc;
use ta_adapters::{PlanningParameters, PlanningResult, RuntimeClientError, TaskRuntimeClient};
use ta_core::{Solution, TaskId};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Runtime(#[from] RuntimeClientError),
}

/// A best solution together with the published-cache snapshot taken when it
/// was handed over.
#[derive(Debug, Clone)]
pub struct PublishJob {
    pub solution: Solution,
    pub published: PublishedTaskCache,
}

/// Planning results for one job, with the window already applied.
#[derive(Debug, Clone, Default)]
pub struct PublishPlan {
    pub results: Vec<PlanningResult>,
    /// Tasks this job exposes for the first time.
    pub newly_published: Vec<TaskId>,
}

/// What happened to a job.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Ids to add to the live cache; empty when the apply failed.
    pub newly_published: Vec<TaskId>,
    pub result: Result<usize, PublishError>,
}

pub struct SolutionPublisher<R> {
    client: Arc<R>,
    window: usize,
    pin_on_publish: bool,
    acting_user: String,
}

impl<R: TaskRuntimeClient> SolutionPublisher<R> {
    pub fn new(client: Arc<R>, config: &PlannerConfig) -> Self {
        Self {
            client,
            window: config.publish_window,
            pin_on_publish: config.pin_on_publish,
            acting_user: config.acting_user.clone(),
        }
    }

    /// Walk every chain in order and build its results, skipping the
    /// placeholder. Per user, unpublished tasks are marked published in chain
    /// order until the user has `window` published tasks.
    pub fn plan(&self, solution: &Solution, published: &PublishedTaskCache) -> PublishPlan {
        let mut plan = PublishPlan::default();
        for user in solution.users() {
            let mut results: Vec<PlanningResult> = Vec::new();
            for task in solution.chain(&user.id).filter(|t| !t.is_placeholder()) {
                let index = results.len() as i32;
                results.push(PlanningResult {
                    container_id: task.container_id.clone(),
                    task_id: task.id,
                    process_instance_id: task.process_instance_id,
                    parameters: PlanningParameters::new(user.id.clone(), index)
                        .pinned(task.pinned)
                        .published(published.is_published(task.id)),
                });
            }

            let mut published_count = results.iter().filter(|r| r.parameters.published).count();
            for result in results.iter_mut() {
                if published_count >= self.window {
                    break;
                }
                if !result.parameters.published {
                    result.parameters.published = true;
                    if self.pin_on_publish {
                        result.parameters.pinned = true;
                    }
                    plan.newly_published.push(result.task_id);
                    published_count += 1;
                }
            }
            plan.results.extend(results);
        }
        plan
    }

    /// Apply one job against the runtime.
    pub async fn publish(&self, job: PublishJob) -> PublishOutcome {
        let plan = self.plan(&job.solution, &job.published);
        let count = plan.results.len();
        debug!(results = count, newly_published = plan.newly_published.len(), "publishing solution");
        match self.client.apply_planning(plan.results, &self.acting_user).await {
            Ok(()) => {
                info!(results = count, newly_published = plan.newly_published.len(), "published solution");
                PublishOutcome { newly_published: plan.newly_published, result: Ok(count) }
            }
            Err(e) => {
                warn!(error = %e, "failed to publish solution");
                PublishOutcome { newly_published: Vec::new(), result: Err(e.into()) }
            }
        }
    }

    /// Publisher loop: take one job, publish it, report back, repeat.
    pub async fn run<F>(
        self,
        mut jobs: mpsc::UnboundedReceiver<PublishJob>,
        cancel: CancellationToken,
        on_processed: F,
    ) where
        F: Fn(PublishOutcome) + Send + Sync,
    {
        loop {
            let job = tokio::select! {
                _ = cancel.cancelled() => break,
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.publish(job) => outcome,
            };
            on_processed(outcome);
        }
        debug!("publisher stopped");
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
