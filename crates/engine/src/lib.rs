// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ta-engine: the continuous planning loop.
//!
//! The [`Planner`] keeps an external optimizer fed with the task runtime's
//! state and publishes the optimizer's best placements back to the runtime.

pub mod assembly;
pub mod cache;
pub mod config;
pub mod driver;
pub mod env;
pub mod greedy;
pub mod optimizer;
pub mod planner;
pub mod publisher;
pub mod synchronizer;

pub use assembly::{build_solution, diff_solution, insert_in_order, AssemblyError, OrderedTask};
pub use cache::PublishedTaskCache;
pub use config::{ConfigError, PlannerConfig, MIN_SYNC_PERIOD};
pub use driver::{DriverError, DriverState, OptimizerDriver};
pub use greedy::{place_unassigned, GreedyOptimizer, GreedyOptimizerFactory};
pub use optimizer::{BestSolution, BestSolutionListener, Optimizer, OptimizerError, OptimizerFactory};
pub use planner::{Planner, PlannerError, PlannerStatus, PlanningState};
pub use publisher::{PublishError, PublishJob, PublishOutcome, PublishPlan, SolutionPublisher};
pub use synchronizer::{SyncHandler, SyncOutcome, Synchronizer};
