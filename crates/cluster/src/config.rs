// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster configuration.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading a cluster config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse cluster config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid cluster config: {0}")]
    Invalid(String),
}

/// Tuning knobs for a [`crate::Cluster`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    /// Fixed worker pool size. One browser engine per worker.
    pub pool_size: usize,
    /// Budget for a loaded page to reach the settled state.
    pub settle_timeout_ms: u64,
    /// Initial backoff between engine relaunch attempts after a crash;
    /// doubles per attempt.
    pub relaunch_backoff_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { pool_size: 4, settle_timeout_ms: 5_000, relaunch_backoff_ms: 250 }
    }
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    snare_core::setters! {
        set {
            pool_size: usize,
            settle_timeout_ms: u64,
            relaunch_backoff_ms: u64,
        }
    }

    /// Parse from TOML, rejecting configs the cluster cannot run with.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        if config.pool_size == 0 {
            return Err(ConfigError::Invalid("pool_size must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn settle_budget(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn relaunch_backoff(&self) -> Duration {
        Duration::from_millis(self.relaunch_backoff_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
