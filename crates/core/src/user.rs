// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workers: chain anchors.

use crate::id::{GroupId, TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Entity id of the owner of last resort.
pub const FALLBACK_USER_ID: &str = "planninguser";

/// A worker and the head of its task chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub groups: BTreeSet<GroupId>,
    /// First task of this worker's chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<TaskId>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self { id: id.into(), groups: BTreeSet::new(), next: None }
    }

    /// The always-present worker that takes tasks nobody else is eligible for.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_USER_ID)
    }

    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupId>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.id == FALLBACK_USER_ID
    }
}
