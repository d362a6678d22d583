// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The assignment solution: an arena of workers and tasks linked into chains.
//!
//! Each worker anchors one chain. Links are stored as identifiers on both
//! ends (`User::next`, `Task::previous`, `Task::next`) and are only written
//! through [`Solution::link_after`], [`Solution::unlink`] and
//! [`Solution::relink`], which also recompute start/end times forward from
//! the edited position.

use crate::chain::{Anchor, ChainError};
use crate::id::{TaskId, UserId};
use crate::task::Task;
use crate::user::{User, FALLBACK_USER_ID};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    users: IndexMap<UserId, User>,
    tasks: IndexMap<TaskId, Task>,
}

/// A placement that breaks the eligibility rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityViolation {
    /// Assigned to a worker that is neither a direct owner nor in an owning group.
    NotEligible { task: TaskId, user: UserId },
    /// Parked on the fallback user although a regular worker is eligible.
    FallbackWhileEligible { task: TaskId, eligible: UserId },
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solution with the given workers and no tasks.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut solution = Self::new();
        for user in users {
            solution.add_user(user);
        }
        solution
    }

    /// Add a worker with an empty chain. An existing worker only has its groups updated.
    pub fn add_user(&mut self, user: User) {
        match self.users.get_mut(&user.id) {
            Some(existing) => existing.groups = user.groups,
            None => {
                self.users.insert(user.id.clone(), User { next: None, ..user });
            }
        }
    }

    /// Insert a task as unassigned.
    pub fn add_task(&mut self, task: Task) -> Result<(), ChainError> {
        if self.tasks.contains_key(&task.id) {
            return Err(ChainError::DuplicateTask(task.id));
        }
        self.tasks.insert(task.id, task.detached());
        Ok(())
    }

    /// Unlink and drop a task. Returns the dropped task, or `None` if absent.
    pub fn remove_task(&mut self, id: TaskId) -> Result<Option<Task>, ChainError> {
        if !self.tasks.contains_key(&id) {
            return Ok(None);
        }
        self.unlink(id)?;
        Ok(self.tasks.shift_remove(&id))
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn fallback_user(&self) -> Option<&User> {
        self.users.get(FALLBACK_USER_ID)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn set_pinned(&mut self, id: TaskId, pinned: bool) -> Result<(), ChainError> {
        let task = self.tasks.get_mut(&id).ok_or(ChainError::UnknownTask(id))?;
        task.pinned = pinned;
        Ok(())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn contains_task(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether any task other than the placeholder exists.
    pub fn has_real_tasks(&self) -> bool {
        self.tasks.keys().any(|id| !id.is_placeholder())
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(|t| t.is_unassigned())
    }

    /// Tasks in chain order for `user`. Empty if the user is unknown.
    pub fn chain(&self, user: &str) -> Chain<'_> {
        Chain {
            solution: self,
            cursor: self.users.get(user).and_then(|u| u.next),
            remaining: self.tasks.len(),
        }
    }

    pub fn chain_ids(&self, user: &str) -> Vec<TaskId> {
        self.chain(user).map(|t| t.id).collect()
    }

    /// Last position of the chain: the user itself when the chain is empty.
    pub fn chain_tail(&self, user: &UserId) -> Anchor {
        match self.chain(user).last() {
            Some(task) => Anchor::Task(task.id),
            None => Anchor::User(user.clone()),
        }
    }

    /// End time of the last task in the chain, 0 when empty.
    pub fn chain_end_time(&self, user: &str) -> u32 {
        self.chain(user).last().and_then(|t| t.end_time).unwrap_or(0)
    }

    /// Walk predecessors to the anchoring worker.
    pub fn assigned_user(&self, id: TaskId) -> Option<&UserId> {
        let mut cursor = self.tasks.get(&id)?.previous.as_ref();
        for _ in 0..=self.tasks.len() {
            match cursor? {
                Anchor::User(user) => return Some(user),
                Anchor::Task(prev) => cursor = self.tasks.get(prev)?.previous.as_ref(),
            }
        }
        None
    }

    /// Position after the leading run of pinned tasks in `user`'s chain.
    pub fn pinned_run_end(&self, user: &UserId) -> Result<Anchor, ChainError> {
        if !self.users.contains_key(user) {
            return Err(ChainError::UnknownUser(user.clone()));
        }
        let mut position = Anchor::User(user.clone());
        for task in self.chain(user) {
            if !task.pinned {
                break;
            }
            position = Anchor::Task(task.id);
        }
        Ok(position)
    }

    pub fn eligible_users<'a>(&'a self, task: &'a Task) -> impl Iterator<Item = &'a User> + 'a {
        self.users.values().filter(move |u| task.is_eligible(u))
    }

    /// Link an unassigned task right after `anchor`, in front of the anchor's
    /// current successor.
    pub fn link_after(&mut self, anchor: &Anchor, id: TaskId) -> Result<(), ChainError> {
        if *anchor == Anchor::Task(id) {
            return Err(ChainError::SelfLink(id));
        }
        let task = self.tasks.get(&id).ok_or(ChainError::UnknownTask(id))?;
        if task.previous.is_some() || task.next.is_some() {
            return Err(ChainError::AlreadyLinked(id));
        }
        let successor = self.next_of(anchor)?;

        if let Some(task) = self.tasks.get_mut(&id) {
            task.previous = Some(anchor.clone());
            task.next = successor;
        }
        self.set_next(anchor, Some(id))?;
        if let Some(succ) = successor.and_then(|s| self.tasks.get_mut(&s)) {
            succ.previous = Some(Anchor::Task(id));
        }
        self.propagate_times(id);
        Ok(())
    }

    /// Detach a task from its chain, joining its neighbours.
    ///
    /// Returns the former predecessor, or `None` if the task was unassigned.
    pub fn unlink(&mut self, id: TaskId) -> Result<Option<Anchor>, ChainError> {
        let task = self.tasks.get_mut(&id).ok_or(ChainError::UnknownTask(id))?;
        let Some(previous) = task.previous.clone() else {
            return Ok(None);
        };
        let successor = task.next;
        task.clear_links();

        self.set_next(&previous, successor)?;
        if let Some(succ_id) = successor {
            if let Some(succ) = self.tasks.get_mut(&succ_id) {
                succ.previous = Some(previous.clone());
            }
            self.propagate_times(succ_id);
        }
        Ok(Some(previous))
    }

    /// Unlink and link after `anchor` in one step.
    pub fn relink(&mut self, id: TaskId, anchor: &Anchor) -> Result<(), ChainError> {
        if *anchor == Anchor::Task(id) {
            return Err(ChainError::SelfLink(id));
        }
        self.unlink(id)?;
        self.link_after(anchor, id)
    }

    /// Check link symmetry, acyclicity, reachability and computed times.
    pub fn validate(&self) -> Result<(), ChainError> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for user in self.users.values() {
            let mut previous = Anchor::User(user.id.clone());
            let mut expected_start = 0;
            let mut cursor = user.next;
            while let Some(id) = cursor {
                if !seen.insert(id) {
                    return Err(ChainError::Cycle { user: user.id.clone(), task: id });
                }
                let task = self.tasks.get(&id).ok_or(ChainError::UnknownTask(id))?;
                if task.previous.as_ref() != Some(&previous) {
                    return Err(ChainError::BrokenBackLink {
                        task: id,
                        recorded: task.previous.clone(),
                        actual: previous,
                    });
                }
                if task.start_time != Some(expected_start)
                    || task.end_time != Some(expected_start.saturating_add(task.duration))
                {
                    return Err(ChainError::StaleTimes {
                        task: id,
                        expected_start,
                        found: task.start_time,
                    });
                }
                expected_start = expected_start.saturating_add(task.duration);
                previous = Anchor::Task(id);
                cursor = task.next;
            }
        }
        for task in self.tasks.values() {
            if !seen.contains(&task.id) && (task.previous.is_some() || task.next.is_some()) {
                return Err(ChainError::Orphaned(task.id));
            }
        }
        Ok(())
    }

    /// Placements that break the eligibility rules.
    pub fn assignment_violations(&self) -> Vec<EligibilityViolation> {
        let mut violations = Vec::new();
        for user in self.users.values() {
            for task in self.chain(&user.id) {
                if user.is_fallback() {
                    if let Some(other) = self.eligible_users(task).find(|u| !u.is_fallback()) {
                        violations.push(EligibilityViolation::FallbackWhileEligible {
                            task: task.id,
                            eligible: other.id.clone(),
                        });
                    }
                } else if !task.is_eligible(user) {
                    violations.push(EligibilityViolation::NotEligible {
                        task: task.id,
                        user: user.id.clone(),
                    });
                }
            }
        }
        violations
    }

    /// Sum of per-task weighted end-time penalties over all chains.
    pub fn weighted_penalty(&self) -> i64 {
        self.tasks
            .values()
            .filter_map(|t| t.end_time.map(|end| t.priority.weighted_penalty(end)))
            .sum()
    }

    fn next_of(&self, anchor: &Anchor) -> Result<Option<TaskId>, ChainError> {
        match anchor {
            Anchor::User(id) => {
                self.users.get(id).map(|u| u.next).ok_or_else(|| ChainError::UnknownUser(id.clone()))
            }
            Anchor::Task(id) => {
                let task = self.tasks.get(id).ok_or(ChainError::UnknownTask(*id))?;
                if task.previous.is_none() {
                    return Err(ChainError::DetachedAnchor(*id));
                }
                Ok(task.next)
            }
        }
    }

    fn set_next(&mut self, anchor: &Anchor, next: Option<TaskId>) -> Result<(), ChainError> {
        match anchor {
            Anchor::User(id) => {
                let user =
                    self.users.get_mut(id).ok_or_else(|| ChainError::UnknownUser(id.clone()))?;
                user.next = next;
            }
            Anchor::Task(id) => {
                let task = self.tasks.get_mut(id).ok_or(ChainError::UnknownTask(*id))?;
                task.next = next;
            }
        }
        Ok(())
    }

    /// Recompute start/end from `from` to the end of its chain.
    fn propagate_times(&mut self, from: TaskId) {
        let mut cursor = Some(from);
        for _ in 0..self.tasks.len() {
            let Some(id) = cursor else { break };
            let start = match self.tasks.get(&id).and_then(|t| t.previous.as_ref()) {
                Some(Anchor::User(_)) => 0,
                Some(Anchor::Task(prev)) => {
                    self.tasks.get(prev).and_then(|t| t.end_time).unwrap_or(0)
                }
                None => break,
            };
            let Some(task) = self.tasks.get_mut(&id) else { break };
            task.start_time = Some(start);
            task.end_time = Some(start.saturating_add(task.duration));
            cursor = task.next;
        }
    }
}

/// Iterator over one worker's chain.
pub struct Chain<'a> {
    solution: &'a Solution,
    cursor: Option<TaskId>,
    remaining: usize,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        // At most one step per task, even on a corrupted chain.
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let task = self.solution.tasks.get(&self.cursor?)?;
        self.cursor = task.next;
        Some(task)
    }
}

#[cfg(test)]
#[path = "solution_tests.rs"]
mod tests;
