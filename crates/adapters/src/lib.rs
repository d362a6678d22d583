// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ta-adapters: interfaces to the task runtime and the worker directory.

pub mod directory;
pub mod runtime;

pub use directory::{DirectoryError, DirectoryUser, UserDirectory};
pub use runtime::{
    PlanningParameters, PlanningResult, RuntimeClientError, TaskRecord, TaskRuntimeClient,
    TaskStatus,
};

#[cfg(any(test, feature = "test-support"))]
pub use directory::FakeUserDirectory;
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{ApplyCall, FakeTaskRuntime, FetchCall};
