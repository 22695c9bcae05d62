// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure taxonomy.
//!
//! Every job failure is captured at the worker boundary and delivered
//! through the job's callback as an `Err`, never thrown back into the
//! scheduler's control flow. The scheduler counts failed jobs as
//! completed for `wait` bookkeeping. There are no automatic retries;
//! a caller that wants one re-queues from its callback.

use snare_adapters::EngineError;
use std::time::Duration;
use thiserror::Error;

/// Why a single job failed.
#[derive(Debug, Error)]
pub enum JobError {
    /// Fetch or parse of the target resource failed.
    #[error("failed to load resource: {0}")]
    ResourceLoad(String),
    /// The caller-supplied injector script raised in-page. Any partially
    /// populated sinks are discarded.
    #[error("injector script failed: {0}")]
    Injector(String),
    /// The page never settled within the configured budget. The worker's
    /// engine is recycled.
    #[error("page did not settle within {}ms", .0.as_millis())]
    SettleTimeout(Duration),
    /// The engine became unresponsive or died. The worker is replaced.
    #[error("browser engine crashed: {0}")]
    EngineCrash(String),
}

/// Errors from the cluster surface itself.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// `queue` was called after `shutdown`; the job was rejected, not
    /// silently dropped.
    #[error("cluster is shut down")]
    ShutDown,
    #[error("invalid cluster config: {0}")]
    Config(String),
    /// The initial worker pool could not be launched.
    #[error("failed to launch worker engine: {0}")]
    Launch(#[from] EngineError),
}
