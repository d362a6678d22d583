// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Baseline in-process optimizer.
//!
//! Applies submitted mutation batches to its working copy and places every
//! unassigned task at the end of the least loaded eligible chain, preferring
//! users named directly as owners and falling back to the fallback user. Pinned tasks and already placed tasks are never
//! moved. It does no further search.

use crate::optimizer::{BestSolution, BestSolutionListener, Optimizer, OptimizerError, OptimizerFactory};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use ta_core::{Mutation, Solution, TaskId, UserId};
use tracing::{debug, error, warn};

#[derive(Default)]
struct GreedyState {
    queue: VecDeque<Vec<Mutation>>,
    terminated: bool,
}

pub struct GreedyOptimizer {
    state: Mutex<GreedyState>,
    wake: Condvar,
    idle_timeout: Duration,
}

impl GreedyOptimizer {
    pub fn new(idle_timeout: Duration) -> Self {
        Self { state: Mutex::new(GreedyState::default()), wake: Condvar::new(), idle_timeout }
    }

    /// Pending batches, or `None` once terminated. Waits while idle.
    fn next_batches(&self, idle: bool) -> Option<Vec<Vec<Mutation>>> {
        let mut state = self.state.lock();
        if idle && state.queue.is_empty() && !state.terminated {
            self.wake.wait_for(&mut state, self.idle_timeout);
        }
        if state.terminated {
            return None;
        }
        Some(state.queue.drain(..).collect())
    }

    fn queue_is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }
}

impl Optimizer for GreedyOptimizer {
    fn solve(&self, initial: Solution, listener: BestSolutionListener) {
        let mut working = initial;
        let mut dirty = true;
        while let Some(batches) = self.next_batches(!dirty) {
            for batch in batches {
                for mutation in &batch {
                    if let Err(e) = mutation.apply(&mut working) {
                        error!(%mutation, error = %e, "rejected mutation");
                    }
                }
                dirty = true;
            }
            if !dirty {
                continue;
            }
            let placed = place_unassigned(&mut working);
            let event = BestSolution {
                all_mutations_processed: self.queue_is_empty(),
                initialized: working.unassigned().next().is_none(),
                solution: working.clone(),
            };
            debug!(
                placed,
                penalty = working.weighted_penalty(),
                initialized = event.initialized,
                "new best solution"
            );
            listener(event);
            dirty = false;
        }
        debug!("greedy optimizer terminated");
    }

    fn submit_mutations(&self, mutations: Vec<Mutation>) {
        self.state.lock().queue.push_back(mutations);
        self.wake.notify_one();
    }

    fn terminate_early(&self) {
        self.state.lock().terminated = true;
        self.wake.notify_all();
    }
}

/// Place every unassigned task. Returns how many were placed.
pub fn place_unassigned(solution: &mut Solution) -> usize {
    let mut pending: Vec<(i32, TaskId)> =
        solution.unassigned().map(|t| (t.priority.value(), t.id)).collect();
    pending.sort_unstable();

    let mut placed = 0;
    for (_, id) in pending {
        let Some(user) = pick_user(solution, id) else {
            warn!(task_id = %id, "no user can take task");
            continue;
        };
        let tail = solution.chain_tail(&user);
        match solution.link_after(&tail, id) {
            Ok(()) => placed += 1,
            Err(e) => error!(task_id = %id, user = %user, error = %e, "failed to place task"),
        }
    }
    placed
}

/// Least loaded eligible regular user, direct owners first, else the
/// fallback user.
fn pick_user(solution: &Solution, id: TaskId) -> Option<UserId> {
    let task = solution.task(id)?;
    solution
        .eligible_users(task)
        .filter(|u| !u.is_fallback())
        .min_by_key(|u| (!task.has_direct_owner(&u.id), solution.chain_end_time(&u.id)))
        .or_else(|| solution.fallback_user())
        .map(|u| u.id.clone())
}

/// Creates [`GreedyOptimizer`]s.
#[derive(Debug, Clone)]
pub struct GreedyOptimizerFactory {
    idle_timeout: Duration,
}

impl GreedyOptimizerFactory {
    pub fn new(idle_timeout: Duration) -> Self {
        Self { idle_timeout }
    }
}

impl OptimizerFactory for GreedyOptimizerFactory {
    fn create(&self) -> Result<Arc<dyn Optimizer>, OptimizerError> {
        Ok(Arc::new(GreedyOptimizer::new(self.idle_timeout)))
    }
}

#[cfg(test)]
#[path = "greedy_tests.rs"]
mod tests;
