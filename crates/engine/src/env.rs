// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the planner.

use std::time::Duration;

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Synchronization period override (`TA_SYNC_PERIOD_MS`).
pub fn sync_period() -> Option<Duration> {
    parsed::<u64>("TA_SYNC_PERIOD_MS").map(Duration::from_millis)
}

/// Publish window override (`TA_PUBLISH_WINDOW`).
pub fn publish_window() -> Option<usize> {
    parsed("TA_PUBLISH_WINDOW")
}

/// Pin newly published tasks (`TA_PIN_ON_PUBLISH`, `true`/`false`/`1`/`0`).
pub fn pin_on_publish() -> Option<bool> {
    let value = std::env::var("TA_PIN_ON_PUBLISH").ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Identity used when applying planning (`TA_ACTING_USER`).
pub fn acting_user() -> Option<String> {
    std::env::var("TA_ACTING_USER").ok().filter(|s| !s.is_empty())
}

/// Task query page size (`TA_PAGE_SIZE`).
pub fn page_size() -> Option<u32> {
    parsed("TA_PAGE_SIZE")
}

/// How long `destroy` waits for the loops to exit (`TA_SHUTDOWN_TIMEOUT_MS`).
pub fn shutdown_timeout() -> Option<Duration> {
    parsed::<u64>("TA_SHUTDOWN_TIMEOUT_MS").map(Duration::from_millis)
}
