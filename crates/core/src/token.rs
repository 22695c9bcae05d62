// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Taint and instrumentation tokens.
//!
//! Both tokens are 32 lowercase hex characters. The hex alphabet matters
//! for [`JavascriptToken`]: it names the in-page instrumentation object
//! (`_<token>TaintTracer`), so it has to stay a valid JS identifier
//! fragment. [`TaintToken`] reuses the same shape so a marker value is
//! never mistaken for incidental page data.

use serde::{Deserialize, Serialize};
use std::fmt;

fn generate_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Unguessable marker value seeded into page state for a single trace job.
///
/// Distinguishes attacker-influenced data from incidental data: the
/// instrumentation runtime only records function calls whose arguments
/// contain this exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaintToken(String);

impl TaintToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(generate_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the token as a quoted JS string literal, for use inside
    /// injector or arming scripts.
    pub fn js_literal(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl fmt::Display for TaintToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaintToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaintToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Cluster-wide token namespacing the in-page instrumentation globals.
///
/// Generated once at cluster construction and shared by every job run
/// through that cluster. Page globals cannot collide with (or spoof) the
/// sink API because the object name embeds this token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JavascriptToken(String);

impl JavascriptToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(generate_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the instrumentation object this token scopes:
    /// `_<token>TaintTracer`.
    pub fn tracer_object(&self) -> String {
        format!("_{}TaintTracer", self.0)
    }

    /// Global path of one of the tracer's sinks, e.g.
    /// `_<token>TaintTracer.data_flow_sink`.
    pub fn sink_path(&self, sink: &str) -> String {
        format!("{}.{}", self.tracer_object(), sink)
    }

    /// JS snippet invoking the execution-flow logging hook. Callers bake
    /// this into URLs or page scripts that should leave an execution-flow
    /// marker when they run.
    pub fn execution_flow_hook(&self) -> String {
        format!("{}.log_execution_flow_sink()", self.tracer_object())
    }
}

impl fmt::Display for JavascriptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
