// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The planner: wires the optimizer driver, the synchronizer and the result
//! publisher together around one piece of shared state.
//!
//! All three loops meet in [`PlanningState`], guarded by a single lock that is
//! never held across an await or while calling into the optimizer:
//!
//! - best solutions from the optimizer become the current solution and are
//!   handed to the publisher, or are stashed as the pending solution while a
//!   publish is in flight (a newer one replaces an older one);
//! - when a publish completes, the pending solution (if any) is promoted and
//!   handed over, otherwise the publisher goes idle;
//! - refreshes diff fetched records against the latest best solution, with
//!   changes the optimizer has not confirmed yet replayed on top, and submit
//!   the result to the optimizer after the lock is released.

use crate::assembly::{build_solution, diff_solution, AssemblyError};
use crate::cache::PublishedTaskCache;
use crate::config::{ConfigError, PlannerConfig};
use crate::driver::{DriverError, DriverState, OptimizerDriver};
use crate::optimizer::{BestSolution, BestSolutionListener, OptimizerFactory};
use crate::publisher::{PublishJob, PublishOutcome, SolutionPublisher};
use crate::synchronizer::{SyncHandler, Synchronizer};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::sync::{Arc, Weak};
use ta_adapters::{DirectoryError, DirectoryUser, RuntimeClientError, TaskRecord, TaskRuntimeClient, UserDirectory};
use ta_core::{Mutation, Solution};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Runtime(#[from] RuntimeClientError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("planner was already started")]
    AlreadyStarted,
    #[error("planner was destroyed")]
    Destroyed,
    #[error("planner loops did not stop within {0:?}")]
    ShutdownTimeout(std::time::Duration),
}

/// State shared by the planner loops.
#[derive(Debug, Default)]
pub struct PlanningState {
    /// Last best solution handed to the publisher.
    pub current: Option<Solution>,
    /// Latest best solution that arrived while a publish was in flight.
    pub next: Option<Solution>,
    pub published: PublishedTaskCache,
    pub processing: bool,
    /// Mutations submitted since the last publishable best solution.
    pub submitted: Vec<Mutation>,
}

/// Point-in-time view of the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerStatus {
    pub driver: DriverState,
    pub publishing: bool,
    pub pending: bool,
    pub published_tasks: usize,
}

impl PlannerStatus {
    pub fn is_started(&self) -> bool {
        self.driver == DriverState::Started
    }

    pub fn is_destroyed(&self) -> bool {
        self.driver == DriverState::Destroyed
    }
}

/// The part of the planner the loops call back into.
struct Coordinator {
    state: Mutex<PlanningState>,
    driver: Arc<OptimizerDriver>,
    jobs: mpsc::UnboundedSender<PublishJob>,
}

impl Coordinator {
    fn new(jobs: mpsc::UnboundedSender<PublishJob>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let listener: BestSolutionListener = Arc::new(move |event: BestSolution| {
                if let Some(coordinator) = weak.upgrade() {
                    coordinator.on_best_solution(event);
                }
            });
            Self {
                state: Mutex::new(PlanningState::default()),
                driver: Arc::new(OptimizerDriver::new(listener)),
                jobs,
            }
        })
    }

    fn on_best_solution(&self, event: BestSolution) {
        if !event.is_publishable() {
            debug!(
                all_mutations_processed = event.all_mutations_processed,
                initialized = event.initialized,
                "best solution not publishable yet"
            );
            return;
        }
        let mut state = self.state.lock();
        state.submitted.clear();
        if state.processing {
            let replaced = state.next.replace(event.solution).is_some();
            debug!(replaced, "publish in flight, solution stashed as pending");
            return;
        }
        state.processing = true;
        self.hand_over(&mut state, event.solution);
    }

    fn on_publish_processed(&self, outcome: PublishOutcome) {
        let mut state = self.state.lock();
        if outcome.result.is_ok() {
            state.published.extend(outcome.newly_published);
        }
        match state.next.take() {
            Some(next) => {
                debug!("publishing pending solution");
                self.hand_over(&mut state, next);
            }
            None => state.processing = false,
        }
    }

    /// Make `solution` current and send it to the publisher with a snapshot
    /// of the cache. Caller holds the lock and has set `processing`.
    fn hand_over(&self, state: &mut PlanningState, solution: Solution) {
        let job = PublishJob { solution: solution.clone(), published: state.published.snapshot() };
        state.current = Some(solution);
        if self.jobs.send(job).is_err() {
            debug!("publisher gone, dropping solution");
            state.processing = false;
        }
    }

    fn status(&self) -> PlannerStatus {
        let state = self.state.lock();
        PlannerStatus {
            driver: self.driver.state(),
            publishing: state.processing,
            pending: state.next.is_some(),
            published_tasks: state.published.len(),
        }
    }
}

impl SyncHandler for Coordinator {
    fn is_started(&self) -> bool {
        self.driver.is_started()
    }

    fn bootstrap(&self, records: Vec<TaskRecord>, users: Vec<DirectoryUser>) -> Result<bool, PlannerError> {
        let mut published = self.state.lock().published.snapshot();
        let solution = build_solution(&records, &users, &mut published)?;
        if !solution.has_real_tasks() {
            return Ok(false);
        }
        info!(
            users = users.len(),
            tasks = solution.task_count(),
            published = published.len(),
            "loaded initial solution"
        );
        self.driver.start(solution)?;
        self.state.lock().published.extend(published.iter());
        Ok(true)
    }

    fn refresh(&self, records: Vec<TaskRecord>) -> Result<usize, PlannerError> {
        let mutations = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            // The pending solution is newer than the one being published.
            let Some(latest) = state.next.as_ref().or(state.current.as_ref()) else {
                debug!("no best solution yet, skipping refresh");
                return Ok(0);
            };
            let working = replay(latest, &state.submitted);
            diff_solution(&working, &records, &mut state.published)?
        };
        if mutations.is_empty() {
            debug!("runtime state unchanged");
            return Ok(0);
        }
        let changes = mutations.len();
        match self.driver.submit_mutations(mutations.clone()) {
            Ok(()) => {
                self.state.lock().submitted.extend(mutations);
                info!(changes, "submitted runtime changes");
                Ok(changes)
            }
            Err(e @ (DriverError::NotStarted | DriverError::Destroyed)) => {
                warn!(changes, error = %e, "discarding runtime changes");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `latest` with `submitted` applied. Changes the solution already reflects
/// fail to apply and are skipped.
fn replay<'a>(latest: &'a Solution, submitted: &[Mutation]) -> Cow<'a, Solution> {
    if submitted.is_empty() {
        return Cow::Borrowed(latest);
    }
    let mut working = latest.clone();
    for mutation in submitted {
        if let Err(e) = mutation.apply(&mut working) {
            debug!(%mutation, error = %e, "submitted change already applied");
        }
    }
    Cow::Owned(working)
}

struct Loops {
    jobs: Option<mpsc::UnboundedReceiver<PublishJob>>,
    handles: Vec<JoinHandle<()>>,
}

/// Continuous task planner.
///
/// ```ignore
/// let planner = Planner::new(config, client, directory, GreedyOptimizerFactory::new(idle));
/// planner.init()?;
/// planner.start()?;
/// // ...
/// planner.destroy().await?;
/// ```
pub struct Planner<R, D> {
    config: PlannerConfig,
    client: Arc<R>,
    directory: Arc<D>,
    factory: Arc<dyn OptimizerFactory>,
    coordinator: Arc<Coordinator>,
    loops: Mutex<Loops>,
    cancel: CancellationToken,
}

impl<R: TaskRuntimeClient, D: UserDirectory> Planner<R, D> {
    pub fn new(
        config: PlannerConfig,
        client: Arc<R>,
        directory: Arc<D>,
        factory: impl OptimizerFactory,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            client,
            directory,
            factory: Arc::new(factory),
            coordinator: Coordinator::new(tx),
            loops: Mutex::new(Loops { jobs: Some(rx), handles: Vec::new() }),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validate the configuration and build the optimizer.
    pub fn init(&self) -> Result<(), PlannerError> {
        self.config.validate()?;
        self.coordinator.driver.init(self.factory.as_ref())?;
        Ok(())
    }

    /// Spawn the driver, publisher and synchronizer loops. Must be called
    /// from within a tokio runtime, after [`Planner::init`].
    pub fn start(&self) -> Result<(), PlannerError> {
        if self.cancel.is_cancelled() {
            return Err(PlannerError::Destroyed);
        }
        if self.coordinator.driver.state() == DriverState::Created {
            return Err(DriverError::NotInitialized.into());
        }
        let mut loops = self.loops.lock();
        let Some(jobs) = loops.jobs.take() else {
            return Err(PlannerError::AlreadyStarted);
        };

        let driver = Arc::clone(&self.coordinator.driver);
        loops.handles.push(tokio::spawn(driver.run()));

        let publisher = SolutionPublisher::new(Arc::clone(&self.client), &self.config);
        let coordinator = Arc::clone(&self.coordinator);
        loops.handles.push(tokio::spawn(publisher.run(
            jobs,
            self.cancel.clone(),
            move |outcome: PublishOutcome| coordinator.on_publish_processed(outcome),
        )));

        let synchronizer = Synchronizer::new(
            Arc::clone(&self.client),
            Arc::clone(&self.directory),
            self.config.sync_period,
            self.config.page_size,
        );
        loops.handles.push(tokio::spawn(
            synchronizer.run(Arc::clone(&self.coordinator), self.cancel.clone()),
        ));

        info!(
            sync_period_ms = self.config.sync_period.as_millis() as u64,
            publish_window = self.config.publish_window,
            "planner started"
        );
        Ok(())
    }

    /// Stop every loop and wait for them to finish. Idempotent, and safe
    /// before [`Planner::start`].
    pub async fn destroy(&self) -> Result<(), PlannerError> {
        let handles = {
            let mut loops = self.loops.lock();
            loops.jobs = None;
            std::mem::take(&mut loops.handles)
        };
        if !self.cancel.is_cancelled() {
            info!("destroying planner");
        }
        self.cancel.cancel();
        self.coordinator.driver.destroy();

        let timeout = self.config.shutdown_timeout;
        let joined = tokio::time::timeout(timeout, async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!(error = %e, "planner loop failed");
                }
            }
        })
        .await;
        match joined {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "planner loops still running after shutdown timeout");
                Err(PlannerError::ShutdownTimeout(timeout))
            }
        }
    }

    pub fn status(&self) -> PlannerStatus {
        self.coordinator.status()
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
