// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Taint seeding: make sure the marker value is present in the page's
//! execution environment before it runs to completion.
//!
//! Arming the tracer with the traced value is engine-side API, so a
//! failure there means the engine is broken, not the page. The injector
//! is arbitrary caller code; only engine-level script errors are
//! checked, never its semantics. A trace job with no injector and a
//! resource that does not self-encode the taint simply yields empty
//! sinks downstream.

use crate::error::JobError;
use snare_adapters::{BrowserEngine, EngineError};
use snare_core::{JavascriptToken, JobKind};

pub(crate) async fn seed(
    engine: &mut dyn BrowserEngine,
    token: &JavascriptToken,
    kind: &JobKind,
) -> Result<(), JobError> {
    let JobKind::TaintTrace { taint, injector } = kind else {
        return Ok(());
    };

    if let Some(taint) = taint {
        let arming = format!("{}.taint = {};", token.tracer_object(), taint.js_literal());
        engine
            .execute(&arming)
            .await
            .map_err(|e| JobError::EngineCrash(format!("tracer arming failed: {e}")))?;
    }

    if let Some(injector) = injector {
        engine.execute(injector).await.map_err(|e| match e {
            EngineError::Script(m) => JobError::Injector(m),
            EngineError::Crashed(m) | EngineError::Transport(m) => JobError::EngineCrash(m),
        })?;
        tracing::debug!("injector applied");
    }

    Ok(())
}

#[cfg(test)]
#[path = "seeder_tests.rs"]
mod tests;
