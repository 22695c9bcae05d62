// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::sink::{DataFlowEntry, DataRecord, ExecutionFlowEntry, TraceFrame};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core trace types.
pub mod strategies {
    use crate::sink::{DataFlowEntry, DataRecord, TraceFrame};
    use proptest::prelude::*;

    pub fn arb_trace_frame() -> impl Strategy<Value = TraceFrame> {
        ("[a-z_ (){};.]{1,40}", proptest::option::of("[a-z_]{1,12}"), proptest::option::of(1u32..500))
            .prop_map(|(source, function, line)| TraceFrame { source, function, line })
    }

    pub fn arb_data_record() -> impl Strategy<Value = DataRecord> {
        ("[a-zA-Z_]{1,16}", proptest::option::of(0usize..4)).prop_map(|(function, idx)| {
            DataRecord { function, arguments: Vec::new(), tainted_argument_index: idx }
        })
    }

    pub fn arb_data_flow_entry() -> impl Strategy<Value = DataFlowEntry> {
        proptest::collection::vec(arb_data_record(), 1..4)
            .prop_map(|data| DataFlowEntry { data })
    }
}

// ── Sink factory functions ──────────────────────────────────────────────

/// A single-frame execution-flow entry with the given call-site source.
pub fn execution_entry(source: &str) -> ExecutionFlowEntry {
    ExecutionFlowEntry {
        trace: vec![TraceFrame { source: source.to_string(), function: None, line: None }],
    }
}

/// A single-record data-flow entry naming the receiving function.
pub fn data_entry(function: &str, argument: serde_json::Value) -> DataFlowEntry {
    DataFlowEntry {
        data: vec![DataRecord {
            function: function.to_string(),
            arguments: vec![argument],
            tainted_argument_index: Some(0),
        }],
    }
}
