// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task priority: 0 is the most urgent, 10 the least.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task priority {0} is out of range, a value between {min} and {max} was expected", min = Priority::MIN, max = Priority::MAX)]
pub struct PriorityError(pub i32);

/// Validated task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 10;

    /// Lowest urgency, used for filler work.
    pub const LOWEST: Priority = Priority(10);

    pub fn new(value: i32) -> Result<Self, PriorityError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(PriorityError(value))
        }
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_high(self) -> bool {
        self.0 <= 2
    }

    pub fn is_medium(self) -> bool {
        (3..=6).contains(&self.0)
    }

    pub fn is_low(self) -> bool {
        self.0 >= 7
    }

    /// Soft penalty for finishing a task at `end_time`: urgent tasks weigh more.
    pub fn weighted_penalty(self, end_time: u32) -> i64 {
        -(11 - i64::from(self.0)) * i64::from(end_time)
    }
}

impl TryFrom<i32> for Priority {
    type Error = PriorityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i32 {
    fn from(p: Priority) -> Self {
        p.value()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
