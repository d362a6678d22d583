// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ids of tasks whose placement has already been exposed to the runtime.

use std::collections::HashSet;
use ta_core::TaskId;

/// Set of published task ids. Ids leave it only when their task is
/// released back to the optimizer.
///
/// The live cache sits behind the planner lock; the publisher gets a
/// [`snapshot`](PublishedTaskCache::snapshot) taken at hand-off time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedTaskCache {
    ids: HashSet<TaskId>,
}

impl PublishedTaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not marked before.
    pub fn mark(&mut self, id: TaskId) -> bool {
        self.ids.insert(id)
    }

    /// Returns `true` if the id was marked.
    pub fn forget(&mut self, id: TaskId) -> bool {
        self.ids.remove(&id)
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        self.ids.extend(ids);
    }

    pub fn is_published(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
