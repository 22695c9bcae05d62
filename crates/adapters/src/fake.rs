// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborators for tests.
//!
//! [`FakeBrowser`] emulates the in-page instrumentation contract over a
//! scripted route table: pages "execute" when the engine is asked to
//! settle, and the tracer sinks fill in exactly the way the real runtime
//! would fill them. Data-flow entries appear only when the armed taint
//! value actually reached the route's sink function, execution-flow
//! entries only when the page invoked the logging hook for the engine's
//! own token. [`FakeHttp`] serves deterministic fixture bodies.

use crate::browser::{BrowserEngine, BrowserLauncher, EngineError, Settled};
use crate::http::{HttpClient, HttpError};
use async_trait::async_trait;
use parking_lot::Mutex;
use snare_core::{
    DataFlowEntry, DataRecord, ExecutionFlowEntry, HttpResponse, JavascriptToken, Page, TraceFrame,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a fixture page behaves once execution settles.
#[derive(Debug, Clone)]
pub enum RouteBehavior {
    /// The page passes the named query parameter to `function`; the
    /// tracer records the call iff the parameter equals the armed taint.
    QueryTaint { function: String, param: String },
    /// The page passes `location.hash` to `function` on hash changes;
    /// the tracer records the call iff the hash carries the armed taint.
    HashTaint { function: String },
    /// The page evaluates the named query parameter as JS from inside an
    /// `onsubmit` handler's logging wrapper. Invoking the execution-flow
    /// hook there leaves a two-frame trace entry.
    DebugEval { param: String },
    /// The page never settles.
    Hang,
    /// The renderer dies while loading this page.
    CrashOnLoad,
    /// Any caller-supplied script raises in this page.
    ScriptError,
}

/// Route table shared by every engine a [`FakeLauncher`] spawns.
#[derive(Debug, Default)]
pub struct FixtureSet {
    routes: Vec<(String, RouteBehavior)>,
}

impl FixtureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The taint-tracer fixture app: the three canonical pages the trace
    /// scenarios run against.
    pub fn taint_tracer() -> Self {
        Self::empty()
            .route(
                "/data_trace/global-functions",
                RouteBehavior::QueryTaint { function: "process".into(), param: "taint".into() },
            )
            .route("needs-injector", RouteBehavior::HashTaint { function: "onClick".into() })
            .route("/debug", RouteBehavior::DebugEval { param: "input".into() })
    }

    /// Register a route matched by substring against the loaded URL.
    pub fn route(mut self, path: impl Into<String>, behavior: RouteBehavior) -> Self {
        self.routes.push((path.into(), behavior));
        self
    }

    fn lookup(&self, url: &str) -> Option<&RouteBehavior> {
        self.routes.iter().find(|(path, _)| url.contains(path.as_str())).map(|(_, b)| b)
    }
}

/// Launches [`FakeBrowser`] instances over a shared fixture table.
///
/// Clones share counters, so a test can keep one clone and hand the
/// other to the cluster.
#[derive(Clone)]
pub struct FakeLauncher {
    fixtures: Arc<FixtureSet>,
    launches: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::with_fixtures(FixtureSet::taint_tracer())
    }

    pub fn with_fixtures(fixtures: FixtureSet) -> Self {
        Self {
            fixtures: Arc::new(fixtures),
            launches: Arc::new(AtomicUsize::new(0)),
            refuse: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of engines launched so far (initial pool + respawns).
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Make every subsequent launch fail.
    pub fn refuse_launches(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(
        &self,
        token: &JavascriptToken,
    ) -> Result<Box<dyn BrowserEngine>, EngineError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(EngineError::Crashed("launch refused".into()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(launches = self.launches(), "fake engine launched");
        Ok(Box::new(FakeBrowser::new(token.clone(), Arc::clone(&self.fixtures))))
    }
}

/// In-memory browser engine honoring the instrumentation contract.
pub struct FakeBrowser {
    token: JavascriptToken,
    fixtures: Arc<FixtureSet>,
    current: Option<Page>,
    armed_taint: Option<String>,
    location_hash: Option<String>,
    execution_sink: Vec<ExecutionFlowEntry>,
    data_sink: Vec<DataFlowEntry>,
    crashed: bool,
}

impl FakeBrowser {
    fn new(token: JavascriptToken, fixtures: Arc<FixtureSet>) -> Self {
        Self {
            token,
            fixtures,
            current: None,
            armed_taint: None,
            location_hash: None,
            execution_sink: Vec::new(),
            data_sink: Vec::new(),
            crashed: false,
        }
    }

    fn alive(&self) -> Result<(), EngineError> {
        if self.crashed {
            Err(EngineError::Crashed("engine instance is gone".into()))
        } else {
            Ok(())
        }
    }

    fn behavior(&self) -> Option<RouteBehavior> {
        let page = self.current.as_ref()?;
        self.fixtures.lookup(&page.url).cloned()
    }

    /// Run the loaded page's scripted behavior, filling the sinks the
    /// way the instrumentation runtime would.
    fn settle_page(&mut self) -> Settled {
        let Some(page) = self.current.clone() else {
            return Settled::Clean;
        };
        match self.behavior() {
            Some(RouteBehavior::Hang) => return Settled::Timeout,
            Some(RouteBehavior::QueryTaint { function, param }) => {
                let value = query_param(&page.url, &param);
                if let (Some(armed), Some(value)) = (&self.armed_taint, value) {
                    if &value == armed {
                        self.data_sink.push(tainted_call(&function, armed));
                    }
                }
            }
            Some(RouteBehavior::HashTaint { function }) => {
                if let (Some(armed), Some(hash)) = (&self.armed_taint, &self.location_hash) {
                    if hash.contains(armed.as_str()) {
                        let entry = tainted_call(&function, armed);
                        self.data_sink.push(entry);
                    }
                }
            }
            Some(RouteBehavior::DebugEval { param }) => {
                let input = query_param(&page.url, &param).unwrap_or_default();
                // Only the engine's own tracer object is callable; a hook
                // call minted with some other token is an undefined global
                // and does nothing.
                if input.contains(&self.token.execution_flow_hook()) {
                    self.execution_sink.push(ExecutionFlowEntry {
                        trace: vec![
                            TraceFrame {
                                source: self.token.execution_flow_hook(),
                                function: Some("log".into()),
                                line: Some(2),
                            },
                            TraceFrame {
                                source: "function onsubmit(event) { log(event); return false; }"
                                    .into(),
                                function: Some("onsubmit".into()),
                                line: Some(1),
                            },
                        ],
                    });
                }
            }
            Some(RouteBehavior::CrashOnLoad | RouteBehavior::ScriptError) | None => {}
        }
        Settled::Clean
    }
}

#[async_trait]
impl BrowserEngine for FakeBrowser {
    async fn load(&mut self, page: &Page) -> Result<(), EngineError> {
        self.alive()?;
        self.current = Some(page.clone());
        self.armed_taint = None;
        self.location_hash = None;
        self.execution_sink.clear();
        self.data_sink.clear();

        if matches!(self.behavior(), Some(RouteBehavior::CrashOnLoad)) {
            self.crashed = true;
            return Err(EngineError::Crashed(format!("renderer died loading {}", page.url)));
        }
        Ok(())
    }

    async fn execute(&mut self, script: &str) -> Result<serde_json::Value, EngineError> {
        self.alive()?;

        // The tracer's own arming assignment is engine-side API, not page
        // code: it works even on pages whose scripts are broken.
        let arm_prefix = format!("{}.taint = ", self.token.tracer_object());
        if let Some(rest) = script.strip_prefix(arm_prefix.as_str()) {
            self.armed_taint = js_string_literal(rest);
            return Ok(serde_json::Value::Null);
        }

        if matches!(self.behavior(), Some(RouteBehavior::ScriptError)) {
            return Err(EngineError::Script(format!(
                "ReferenceError evaluating {}",
                snare_core::short(script, 40)
            )));
        }

        if let Some(rest) = script.strip_prefix("location.hash = ") {
            self.location_hash = js_string_literal(rest);
        }
        Ok(serde_json::Value::Null)
    }

    async fn wait_for_idle(&mut self, _budget: Duration) -> Result<Settled, EngineError> {
        self.alive()?;
        Ok(self.settle_page())
    }

    async fn read_global(&mut self, path: &str) -> Result<serde_json::Value, EngineError> {
        self.alive()?;
        let value = if path == self.token.sink_path("execution_flow_sink") {
            serde_json::to_value(&self.execution_sink)
        } else if path == self.token.sink_path("data_flow_sink") {
            serde_json::to_value(&self.data_sink)
        } else {
            // Unknown global (wrong token, typo) reads as absent.
            return Ok(serde_json::Value::Null);
        };
        value.map_err(|e| EngineError::Transport(e.to_string()))
    }

    async fn terminate(&mut self) {
        self.crashed = true;
        self.current = None;
    }
}

fn tainted_call(function: &str, armed: &str) -> DataFlowEntry {
    DataFlowEntry {
        data: vec![DataRecord {
            function: function.to_string(),
            arguments: vec![serde_json::Value::String(armed.to_string())],
            tainted_argument_index: Some(0),
        }],
    }
}

/// Parse a double-quoted JS string literal (with optional trailing `;`).
fn js_string_literal(raw: &str) -> Option<String> {
    serde_json::from_str(raw.trim_end().trim_end_matches(';')).ok()
}

/// Extract a raw query parameter from a URL without percent-decoding;
/// fixture URLs never encode.
fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Deterministic HTTP collaborator serving the fixture pages.
#[derive(Clone, Default)]
pub struct FakeHttp {
    failures: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any URL containing `fragment` fail with a connection error.
    pub fn fail_matching(&self, fragment: impl Into<String>) {
        self.failures.lock().push(fragment.into());
    }

    /// URLs fetched so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.lock().push(url.to_string());
        if self.failures.lock().iter().any(|f| url.contains(f.as_str())) {
            return Err(HttpError::Unreachable {
                url: url.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(HttpResponse { url: url.to_string(), status: 200, body: fixture_body(url) })
    }
}

fn fixture_body(url: &str) -> String {
    let script = if url.contains("/data_trace/global-functions") {
        "function process(input) {} process(location.search.split('taint=')[1]);"
    } else if url.contains("needs-injector") {
        "function onClick(input) {} window.onhashchange = \
         function () { onClick(location.hash.slice(1)); };"
    } else if url.contains("/debug") {
        "function onsubmit(event) { log(event); return false; }"
    } else {
        ""
    };
    format!("<html><body><script>{script}</script></body></html>")
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
