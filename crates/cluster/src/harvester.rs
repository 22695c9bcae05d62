// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink harvesting: read back the entries the instrumentation runtime
//! accumulated under the cluster token, in page-execution order.
//!
//! Each sink is read once per job, after the page settles. A sink the
//! runtime never wrote to reads as JSON null and becomes an empty
//! sequence. Entries are copied without reordering.

use crate::error::JobError;
use serde::de::DeserializeOwned;
use snare_adapters::BrowserEngine;
use snare_core::{Dom, JavascriptToken};

pub(crate) async fn harvest(
    engine: &mut dyn BrowserEngine,
    token: &JavascriptToken,
) -> Result<Dom, JobError> {
    let execution_flow_sink = read_sink(engine, token, "execution_flow_sink").await?;
    let data_flow_sink = read_sink(engine, token, "data_flow_sink").await?;
    Ok(Dom { execution_flow_sink, data_flow_sink })
}

async fn read_sink<T: DeserializeOwned>(
    engine: &mut dyn BrowserEngine,
    token: &JavascriptToken,
    sink: &str,
) -> Result<Vec<T>, JobError> {
    let value = engine
        .read_global(&token.sink_path(sink))
        .await
        .map_err(|e| JobError::EngineCrash(e.to_string()))?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
        .map_err(|e| JobError::EngineCrash(format!("malformed {sink} payload: {e}")))
}

#[cfg(test)]
#[path = "harvester_tests.rs"]
mod tests;
