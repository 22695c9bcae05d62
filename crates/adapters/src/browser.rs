// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser-engine boundary.
//!
//! One [`BrowserEngine`] instance is exclusively owned by one worker for
//! the worker's lifetime (or until recycled after a crash). The engine is
//! expected to install the instrumentation runtime under the
//! `_<token>TaintTracer` global at launch; the cluster only ever reads
//! that object back through [`BrowserEngine::read_global`].

use async_trait::async_trait;
use snare_core::{JavascriptToken, Page};
use std::time::Duration;
use thiserror::Error;

/// Outcome of waiting for page execution to settle.
///
/// "Settled" means no pending network activity and no pending timers or
/// microtasks attributable to the load, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Clean,
    Timeout,
}

snare_core::simple_display! {
    Settled {
        Clean => "clean",
        Timeout => "timeout",
    }
}

/// Errors from browser-engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process became unresponsive or terminated unexpectedly.
    /// Unrecoverable: the owning worker dies and its slot is respawned.
    #[error("engine crashed: {0}")]
    Crashed(String),
    /// A script raised inside the page. Recoverable; the engine is intact.
    #[error("script error: {0}")]
    Script(String),
    /// The transport to the engine failed mid-operation.
    #[error("engine transport error: {0}")]
    Transport(String),
}

/// One browser-engine instance: loads pages, runs scripts, reports
/// settledness, and exposes page globals for harvesting.
#[async_trait]
pub trait BrowserEngine: Send {
    /// Navigate to the page definition and begin executing it.
    async fn load(&mut self, page: &Page) -> Result<(), EngineError>;

    /// Evaluate a script in the page's context, returning its value.
    async fn execute(&mut self, script: &str) -> Result<serde_json::Value, EngineError>;

    /// Wait until the page settles or the budget is exhausted.
    async fn wait_for_idle(&mut self, budget: Duration) -> Result<Settled, EngineError>;

    /// Read a global (dotted path) from the page's runtime state.
    /// An absent global reads as JSON `null`.
    async fn read_global(&mut self, path: &str) -> Result<serde_json::Value, EngineError>;

    /// Forcibly tear the instance down. Infallible by contract; a dead
    /// engine is simply gone.
    async fn terminate(&mut self);
}

/// Spawns engine instances for the worker pool.
///
/// The cluster's instrumentation token is handed over at launch so the
/// engine can install the tracer runtime under the right global name.
#[async_trait]
pub trait BrowserLauncher: Send + Sync + 'static {
    async fn launch(&self, token: &JavascriptToken)
        -> Result<Box<dyn BrowserEngine>, EngineError>;
}
