// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job model.
//!
//! A job is one unit of browser work: a target resource plus the kind of
//! analysis to run against it. Jobs are immutable once enqueued and are
//! never reused; the cluster assigns the [`JobId`] at enqueue time.

use crate::resource::{Page, Resource};
use crate::token::TaintToken;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job instance, assigned at enqueue time.
    pub struct JobId("job-");
}

/// What to do with the resolved page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobKind {
    /// Load the page, let it settle, return it. No seeding, no harvest.
    Load,
    /// Seed the taint, run the page, harvest both trace sinks.
    ///
    /// `taint` is the marker value being traced; data-flow traces require
    /// it, execution-flow traces carry none because the trigger is baked
    /// into the resource itself. `injector` is caller-supplied JS run
    /// against the loaded page to place the taint when the resource
    /// cannot otherwise be made to carry it.
    TaintTrace {
        taint: Option<TaintToken>,
        injector: Option<String>,
    },
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JobKind::Load => "load",
            JobKind::TaintTrace { .. } => "taint_trace",
        })
    }
}

/// One unit of work for the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub resource: Resource,
    pub kind: JobKind,
}

impl Job {
    /// A generic page-load job.
    pub fn load(resource: impl Into<Resource>) -> Self {
        Self { resource: resource.into(), kind: JobKind::Load }
    }

    /// Start building a taint-trace job against `resource`.
    pub fn taint_trace(resource: impl Into<Resource>) -> TaintTraceBuilder {
        TaintTraceBuilder { resource: resource.into(), taint: None, injector: None }
    }

    /// True when this job reads the trace sinks after execution.
    pub fn harvests(&self) -> bool {
        matches!(self.kind, JobKind::TaintTrace { .. })
    }
}

impl From<Resource> for Job {
    fn from(resource: Resource) -> Self {
        Job::load(resource)
    }
}

/// Builder for taint-trace jobs.
pub struct TaintTraceBuilder {
    resource: Resource,
    taint: Option<TaintToken>,
    injector: Option<String>,
}

impl TaintTraceBuilder {
    crate::setters! {
        option {
            taint: TaintToken,
            injector: String,
        }
    }

    pub fn build(self) -> Job {
        Job {
            resource: self.resource,
            kind: JobKind::TaintTrace { taint: self.taint, injector: self.injector },
        }
    }
}

/// Successful outcome of a job: the resolved page with both harvested
/// sink collections on its `dom` (at most one non-empty per job shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    pub job_id: JobId,
    pub page: Page,
    pub elapsed_ms: u64,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
