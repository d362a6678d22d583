// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Eligible-owner references on a task.
//!
//! A task lists who may work on it: either specific workers or whole groups.
//! Serializes as a string using the Display format:
//! - `"user:john"`
//! - `"group:HR"`

use crate::id::{GroupId, UserId};
use crate::user::User;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerRef {
    User(UserId),
    Group(GroupId),
}

impl serde::Serialize for OwnerRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for OwnerRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(OwnerRef::parse(&s))
    }
}

impl OwnerRef {
    pub fn user(id: impl Into<UserId>) -> Self {
        OwnerRef::User(id.into())
    }

    pub fn group(id: impl Into<GroupId>) -> Self {
        OwnerRef::Group(id.into())
    }

    /// Parse from Display format. Bare strings are treated as user ids.
    pub fn parse(s: &str) -> Self {
        if let Some(rest) = s.strip_prefix("user:") {
            OwnerRef::User(UserId::new(rest))
        } else if let Some(rest) = s.strip_prefix("group:") {
            OwnerRef::Group(GroupId::new(rest))
        } else {
            OwnerRef::User(UserId::new(s))
        }
    }

    /// Whether `user` is covered by this reference, directly or by group.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            OwnerRef::User(id) => *id == user.id,
            OwnerRef::Group(id) => user.groups.contains(id),
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerRef::User(id) => write!(f, "user:{}", id),
            OwnerRef::Group(id) => write!(f, "group:{}", id),
        }
    }
}

impl From<UserId> for OwnerRef {
    fn from(id: UserId) -> Self {
        OwnerRef::User(id)
    }
}

impl From<GroupId> for OwnerRef {
    fn from(id: GroupId) -> Self {
        OwnerRef::Group(id)
    }
}

#[cfg(test)]
#[path = "owner_tests.rs"]
mod tests;
