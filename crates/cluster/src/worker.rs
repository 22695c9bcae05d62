// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job execution state machine.
//!
//! `idle → loading → executing → harvesting → idle`, with any stage
//! allowed to fail. The worker owns its engine exclusively; the
//! scheduler only sees the final `Result` and the status transitions.

use crate::error::JobError;
use crate::{harvester, resolver, seeder};
use serde::Serialize;
use snare_adapters::{BrowserEngine, EngineError, HttpClient, Settled};
use snare_core::{JavascriptToken, Job, Page};
use std::time::Duration;

/// Observable state of one worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Busy,
    /// Engine lost; the slot is respawned in place.
    Dead,
}

snare_core::simple_display! {
    WorkerStatus {
        Idle => "idle",
        Busy => "busy",
        Dead => "dead",
    }
}

/// Run one job to completion against this worker's engine.
///
/// Returns the resolved page with its harvested sinks; the caller wraps
/// it into the job's result. Generic-load jobs skip seeding and harvest
/// entirely.
pub(crate) async fn execute_job<H: HttpClient>(
    engine: &mut dyn BrowserEngine,
    http: &H,
    token: &JavascriptToken,
    settle_budget: Duration,
    job: &Job,
) -> Result<Page, JobError> {
    // loading
    let mut page = resolver::resolve(&job.resource, http).await?;
    engine.load(&page).await.map_err(|e| match e {
        EngineError::Crashed(m) => JobError::EngineCrash(m),
        EngineError::Script(m) | EngineError::Transport(m) => JobError::ResourceLoad(m),
    })?;

    // executing
    seeder::seed(engine, token, &job.kind).await?;
    let settled = engine
        .wait_for_idle(settle_budget)
        .await
        .map_err(|e| JobError::EngineCrash(e.to_string()))?;
    if settled == Settled::Timeout {
        return Err(JobError::SettleTimeout(settle_budget));
    }

    // harvesting
    if job.harvests() {
        page.dom = harvester::harvest(engine, token).await?;
    }
    Ok(page)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
