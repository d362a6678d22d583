// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker directory: who can be assigned work, and their groups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ta_core::{GroupId, User, UserId};
use thiserror::Error;

/// Errors from directory lookups
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("user lookup failed: {0}")]
    Lookup(String),
}

/// A worker as listed by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: UserId,
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

impl DirectoryUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self { id: id.into(), groups: Vec::new() }
    }

    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupId>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

impl From<&DirectoryUser> for User {
    fn from(user: &DirectoryUser) -> Self {
        User::new(user.id.clone()).with_groups(user.groups.iter().cloned())
    }
}

/// Source of the worker set.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    async fn find_all_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{DirectoryError, DirectoryUser, UserDirectory};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeDirectoryState {
        users: Vec<DirectoryUser>,
        calls: usize,
        failures: usize,
    }

    /// Fake directory for testing
    #[derive(Clone, Default)]
    pub struct FakeUserDirectory {
        inner: Arc<Mutex<FakeDirectoryState>>,
    }

    impl FakeUserDirectory {
        pub fn new(users: Vec<DirectoryUser>) -> Self {
            let fake = Self::default();
            fake.set_users(users);
            fake
        }

        pub fn set_users(&self, users: Vec<DirectoryUser>) {
            self.inner.lock().users = users;
        }

        /// Number of `find_all_users` calls so far
        pub fn calls(&self) -> usize {
            self.inner.lock().calls
        }

        /// Fail the next `n` lookups.
        pub fn fail_lookups(&self, n: usize) {
            self.inner.lock().failures = n;
        }
    }

    #[async_trait]
    impl UserDirectory for FakeUserDirectory {
        async fn find_all_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
            let mut inner = self.inner.lock();
            inner.calls += 1;
            if inner.failures > 0 {
                inner.failures -= 1;
                return Err(DirectoryError::Lookup("injected failure".to_string()));
            }
            Ok(inner.users.clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeUserDirectory;

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
