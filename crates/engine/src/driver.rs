// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimizer driver: owns the optimizer lifecycle.
//!
//! `Created -> Initialized -> Started -> Destroyed`. The driver loop
//! ([`OptimizerDriver::run`]) waits on a start permit and then runs the
//! blocking solve on tokio's blocking pool until the optimizer terminates.

use crate::optimizer::{BestSolution, BestSolutionListener, Optimizer, OptimizerError, OptimizerFactory};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use ta_core::{Mutation, Solution};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Created,
    Initialized,
    Started,
    Destroyed,
}

ta_core::simple_display! {
    DriverState {
        Created => "created",
        Initialized => "initialized",
        Started => "started",
        Destroyed => "destroyed",
    }
}

/// Usage-sequencing errors. These indicate a caller bug, not a transient condition.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("optimizer driver cannot be initialized while {0}")]
    AlreadyInitialized(DriverState),
    #[error("optimizer driver must be initialized before it is started")]
    NotInitialized,
    #[error("optimizer driver was already started")]
    AlreadyStarted,
    #[error("optimizer driver is not started")]
    NotStarted,
    #[error("optimizer driver was destroyed")]
    Destroyed,
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

struct DriverInner {
    state: DriverState,
    optimizer: Option<Arc<dyn Optimizer>>,
    initial: Option<Solution>,
}

pub struct OptimizerDriver {
    inner: Mutex<DriverInner>,
    start_permit: Semaphore,
    listener: BestSolutionListener,
}

impl OptimizerDriver {
    /// A driver in `Created` state. `listener` receives every best solution
    /// reported before the driver is destroyed.
    pub fn new(listener: BestSolutionListener) -> Self {
        Self {
            inner: Mutex::new(DriverInner {
                state: DriverState::Created,
                optimizer: None,
                initial: None,
            }),
            start_permit: Semaphore::new(0),
            listener,
        }
    }

    /// A driver that skips `init` and starts out `Initialized`.
    pub fn with_optimizer(optimizer: Arc<dyn Optimizer>, listener: BestSolutionListener) -> Self {
        let driver = Self::new(listener);
        {
            let mut inner = driver.inner.lock();
            inner.optimizer = Some(optimizer);
            inner.state = DriverState::Initialized;
        }
        driver
    }

    pub fn state(&self) -> DriverState {
        self.inner.lock().state
    }

    pub fn is_started(&self) -> bool {
        self.state() == DriverState::Started
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == DriverState::Destroyed
    }

    /// Build the optimizer. Callable once, from `Created`.
    pub fn init(&self, factory: &dyn OptimizerFactory) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Created {
            return Err(DriverError::AlreadyInitialized(inner.state));
        }
        inner.optimizer = Some(factory.create()?);
        inner.state = DriverState::Initialized;
        debug!("optimizer driver initialized");
        Ok(())
    }

    /// Hand over the initial solution and release the driver loop.
    pub fn start(&self, initial: Solution) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        match inner.state {
            DriverState::Initialized => {}
            DriverState::Created => return Err(DriverError::NotInitialized),
            DriverState::Started => return Err(DriverError::AlreadyStarted),
            DriverState::Destroyed => return Err(DriverError::Destroyed),
        }
        info!(
            users = initial.users().count(),
            tasks = initial.task_count(),
            "starting optimizer"
        );
        inner.initial = Some(initial);
        inner.state = DriverState::Started;
        self.start_permit.add_permits(1);
        Ok(())
    }

    /// Forward a mutation batch to the running optimizer.
    pub fn submit_mutations(&self, mutations: Vec<Mutation>) -> Result<(), DriverError> {
        let optimizer = {
            let inner = self.inner.lock();
            match inner.state {
                DriverState::Started => inner.optimizer.clone(),
                DriverState::Destroyed => return Err(DriverError::Destroyed),
                DriverState::Created | DriverState::Initialized => {
                    return Err(DriverError::NotStarted)
                }
            }
        };
        let Some(optimizer) = optimizer else {
            return Err(DriverError::NotInitialized);
        };
        debug!(mutations = mutations.len(), "submitting mutations");
        optimizer.submit_mutations(mutations);
        Ok(())
    }

    /// Idempotent. Terminates a started optimizer or unblocks a waiting loop.
    pub fn destroy(&self) {
        let (previous, optimizer) = {
            let mut inner = self.inner.lock();
            let previous = inner.state;
            inner.state = DriverState::Destroyed;
            (previous, inner.optimizer.clone())
        };
        match previous {
            DriverState::Destroyed => {}
            DriverState::Started => {
                info!("terminating optimizer");
                if let Some(optimizer) = optimizer {
                    optimizer.terminate_early();
                }
            }
            DriverState::Created | DriverState::Initialized => {
                debug!(state = %previous, "destroying optimizer driver before start");
                self.start_permit.add_permits(1);
            }
        }
    }

    /// Driver loop. Returns once the optimizer terminates or the driver is
    /// destroyed before starting.
    pub async fn run(self: Arc<Self>) {
        match self.start_permit.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return,
        }
        let (optimizer, initial) = {
            let mut inner = self.inner.lock();
            if inner.state == DriverState::Destroyed {
                debug!("optimizer driver destroyed before solving");
                return;
            }
            (inner.optimizer.clone(), inner.initial.take())
        };
        let (Some(optimizer), Some(initial)) = (optimizer, initial) else {
            warn!("optimizer driver released without an optimizer or initial solution");
            return;
        };

        let listener = self.forwarding_listener();
        match tokio::task::spawn_blocking(move || optimizer.solve(initial, listener)).await {
            Ok(()) => info!("optimizer terminated"),
            Err(e) => error!(error = %e, "optimizer solve aborted"),
        }
    }

    /// Drops events once the driver is destroyed.
    fn forwarding_listener(self: &Arc<Self>) -> BestSolutionListener {
        let driver: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |event: BestSolution| {
            let Some(driver) = driver.upgrade() else { return };
            if driver.is_destroyed() {
                debug!("dropping best solution after destroy");
                return;
            }
            (driver.listener)(event);
        })
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
