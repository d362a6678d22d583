// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The optimizer seam.
//!
//! The search engine is external: the planner hands it an initial solution,
//! feeds it [`Mutation`] batches while it runs, and listens for improved
//! solutions. Implementations must apply mutations with exclusive access to
//! their working copy.

use std::sync::Arc;
use ta_core::{Mutation, Solution};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OptimizerError {
    #[error("failed to build optimizer: {0}")]
    Build(String),
}

/// A new best solution reported by the optimizer.
#[derive(Debug, Clone)]
pub struct BestSolution {
    pub solution: Solution,
    /// Every submitted mutation has been applied to `solution`.
    pub all_mutations_processed: bool,
    /// No task is left unplaced.
    pub initialized: bool,
}

impl BestSolution {
    /// Only complete, up-to-date solutions may be published.
    pub fn is_publishable(&self) -> bool {
        self.all_mutations_processed && self.initialized
    }
}

/// Callback invoked from the optimizer's solving thread.
pub type BestSolutionListener = Arc<dyn Fn(BestSolution) + Send + Sync>;

pub trait Optimizer: Send + Sync + 'static {
    /// Search until [`Optimizer::terminate_early`] is called. Blocks the caller.
    fn solve(&self, initial: Solution, listener: BestSolutionListener);

    /// Queue a batch to be applied to the working copy, in order.
    fn submit_mutations(&self, mutations: Vec<Mutation>);

    /// Ask a running or about-to-run `solve` to return.
    fn terminate_early(&self);
}

/// Builds the optimizer when the driver is initialized.
pub trait OptimizerFactory: Send + Sync + 'static {
    fn create(&self) -> Result<Arc<dyn Optimizer>, OptimizerError>;
}
