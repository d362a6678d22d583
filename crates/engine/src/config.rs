// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planner configuration.
//!
//! Defaults, optionally overlaid by a TOML file, then by `TA_*` environment
//! variables (see [`crate::env`]).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Shortest accepted synchronization period.
pub const MIN_SYNC_PERIOD: Duration = Duration::from_millis(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Time between two synchronizations with the task runtime.
    #[serde(rename = "sync_period_ms", with = "millis")]
    pub sync_period: Duration,
    /// Unpublished tasks exposed per user and publish.
    pub publish_window: usize,
    /// Persist newly published tasks as pinned.
    pub pin_on_publish: bool,
    /// Identity the runtime sees when planning is applied.
    pub acting_user: String,
    pub page_size: u32,
    #[serde(rename = "shutdown_timeout_ms", with = "millis")]
    pub shutdown_timeout: Duration,
    /// How long the built-in optimizer sleeps when it has nothing to do.
    #[serde(rename = "optimizer_idle_timeout_ms", with = "millis")]
    pub optimizer_idle_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            sync_period: Duration::from_secs(10),
            publish_window: 4,
            pin_on_publish: false,
            acting_user: "planner".to_string(),
            page_size: 100_000,
            shutdown_timeout: Duration::from_secs(30),
            optimizer_idle_timeout: Duration::from_millis(250),
        }
    }
}

impl PlannerConfig {
    ta_core::setters! {
        into { acting_user: String }
        set {
            sync_period: Duration,
            publish_window: usize,
            pin_on_publish: bool,
            page_size: u32,
            shutdown_timeout: Duration,
            optimizer_idle_timeout: Duration,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&text)?;
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = crate::env::sync_period() {
            self.sync_period = v;
        }
        if let Some(v) = crate::env::publish_window() {
            self.publish_window = v;
        }
        if let Some(v) = crate::env::pin_on_publish() {
            self.pin_on_publish = v;
        }
        if let Some(v) = crate::env::acting_user() {
            self.acting_user = v;
        }
        if let Some(v) = crate::env::page_size() {
            self.page_size = v;
        }
        if let Some(v) = crate::env::shutdown_timeout() {
            self.shutdown_timeout = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_period <= MIN_SYNC_PERIOD {
            return Err(ConfigError::Invalid(format!(
                "sync period must be greater than {}ms, got {}ms",
                MIN_SYNC_PERIOD.as_millis(),
                self.sync_period.as_millis()
            )));
        }
        if self.publish_window == 0 {
            return Err(ConfigError::Invalid("publish window must be at least 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page size must be at least 1".to_string()));
        }
        if self.acting_user.is_empty() {
            return Err(ConfigError::Invalid("acting user must not be empty".to_string()));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
