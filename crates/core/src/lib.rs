// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ta-core: chain-based assignment model for the task planner.
//!
//! Workers anchor chains of tasks; the chain order is the planned work order.
//! [`Mutation`]s are the structural edits applied to a running search.

pub mod macros;

pub mod chain;
pub mod id;
pub mod mutation;
pub mod owner;
pub mod priority;
pub mod solution;
pub mod task;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chain::{Anchor, ChainError};
pub use id::{GroupId, TaskId, UserId};
pub use mutation::{apply_all, Mutation, MutationError};
pub use owner::OwnerRef;
pub use priority::{Priority, PriorityError};
pub use solution::{Chain, EligibilityViolation, Solution};
#[cfg(any(test, feature = "test-support"))]
pub use task::TaskBuilder;
pub use task::{Task, DEFAULT_DURATION, PLACEHOLDER_NAME};
pub use user::{User, FALLBACK_USER_ID};
