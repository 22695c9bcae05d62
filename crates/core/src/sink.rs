// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trace sink model.
//!
//! The instrumentation runtime accumulates two ordered, token-namespaced
//! sinks while a page executes. The harvester decodes them from the JSON
//! the browser engine hands back; the types here mirror that payload
//! shape exactly, so `serde_json::from_value` is the whole decode step.

use serde::{Deserialize, Serialize};

/// One call-site record inside an execution-flow entry.
///
/// `source` is the literal call expression or function definition text
/// observed at that frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One explicit "this code point executed" signal.
///
/// Appended each time page code invokes the logging hook; `trace` is
/// ordered innermost-first (the hook call site, then its callers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFlowEntry {
    pub trace: Vec<TraceFrame>,
}

/// Snapshot of one function call that received the taint value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    /// Name of the function that received the tainted argument.
    pub function: String,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
    /// Index of the argument carrying the taint, when the runtime could
    /// pinpoint it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tainted_argument_index: Option<usize>,
}

/// One intercepted tainted call, with its ordered argument snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlowEntry {
    pub data: Vec<DataRecord>,
}

/// Harvested page runtime state: both sinks, in page-execution order.
///
/// A sink the instrumentation never wrote to is an empty sequence, never
/// absent. For a single taint-trace job at most one of the two is
/// non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dom {
    #[serde(default)]
    pub execution_flow_sink: Vec<ExecutionFlowEntry>,
    #[serde(default)]
    pub data_flow_sink: Vec<DataFlowEntry>,
}

impl Dom {
    /// True when neither sink holds an entry (a valid "no finding" outcome).
    pub fn is_empty(&self) -> bool {
        self.execution_flow_sink.is_empty() && self.data_flow_sink.is_empty()
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
