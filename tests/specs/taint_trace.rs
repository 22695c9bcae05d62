//! Taint-trace specs: the canonical data-flow, injector, and
//! execution-flow scenarios, each across all three resource variants.

use crate::prelude::*;
use snare_adapters::HttpClient;
use snare_core::{Job, Page, Resource, TaintToken, TraceResult};

fn assert_data_flow(result: &TraceResult, function: &str) {
    let dom = &result.page.dom;
    assert!(dom.execution_flow_sink.is_empty(), "execution sink should stay empty");

    assert_eq!(dom.data_flow_sink.len(), 1);
    let data = &dom.data_flow_sink[0].data;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].function, function);
}

fn assert_execution_flow(result: &TraceResult) {
    let dom = &result.page.dom;
    assert!(dom.data_flow_sink.is_empty(), "data sink should stay empty");

    assert_eq!(dom.execution_flow_sink.len(), 1);
    let trace = &dom.execution_flow_sink[0].trace;
    assert_eq!(trace.len(), 2);
    assert!(trace[0].source.contains("log_execution_flow_sink()"));
    assert!(trace[1].source.starts_with("function onsubmit"));
}

fn data_trace_url(taint: &TaintToken) -> String {
    format!("{FIXTURE_BASE}/data_trace/global-functions?taint={taint}")
}

// ── data-flow, taint in the query string ────────────────────────────────

#[tokio::test]
async fn data_flow_from_url_resource() {
    let (cluster, _http) = start_cluster().await;
    let taint = TaintToken::generate();

    let job = Job::taint_trace(Resource::url(data_trace_url(&taint))).taint(taint).build();
    assert_data_flow(&run_one(&cluster, job).await, "process");
    cluster.shutdown().await;
}

#[tokio::test]
async fn data_flow_from_response_resource() {
    let (cluster, http) = start_cluster().await;
    let taint = TaintToken::generate();

    let response = http.get(&data_trace_url(&taint)).await.expect("fixture fetch");
    let job = Job::taint_trace(Resource::from(response)).taint(taint).build();
    assert_data_flow(&run_one(&cluster, job).await, "process");
    cluster.shutdown().await;
}

#[tokio::test]
async fn data_flow_from_page_resource() {
    let (cluster, http) = start_cluster().await;
    let taint = TaintToken::generate();

    let page = Page::from_response(http.get(&data_trace_url(&taint)).await.expect("fixture fetch"));
    let job = Job::taint_trace(Resource::from(page)).taint(taint).build();
    assert_data_flow(&run_one(&cluster, job).await, "process");
    cluster.shutdown().await;
}

// ── data-flow, taint placed by a custom injector ────────────────────────

fn injector_for(taint: &TaintToken) -> String {
    format!("location.hash = {}", taint.js_literal())
}

#[tokio::test]
async fn injected_data_flow_from_url_resource() {
    let (cluster, _http) = start_cluster().await;
    let taint = TaintToken::generate();

    let job = Job::taint_trace(Resource::url(format!("{FIXTURE_BASE}/needs-injector")))
        .taint(taint.clone())
        .injector(injector_for(&taint))
        .build();
    assert_data_flow(&run_one(&cluster, job).await, "onClick");
    cluster.shutdown().await;
}

#[tokio::test]
async fn injected_data_flow_from_response_resource() {
    let (cluster, http) = start_cluster().await;
    let taint = TaintToken::generate();

    let response =
        http.get(&format!("{FIXTURE_BASE}/needs-injector")).await.expect("fixture fetch");
    let job = Job::taint_trace(Resource::from(response))
        .taint(taint.clone())
        .injector(injector_for(&taint))
        .build();
    assert_data_flow(&run_one(&cluster, job).await, "onClick");
    cluster.shutdown().await;
}

#[tokio::test]
async fn injected_data_flow_from_page_resource() {
    let (cluster, http) = start_cluster().await;
    let taint = TaintToken::generate();

    let page = Page::from_response(
        http.get(&format!("{FIXTURE_BASE}/needs-injector")).await.expect("fixture fetch"),
    );
    let job = Job::taint_trace(Resource::from(page))
        .taint(taint.clone())
        .injector(injector_for(&taint))
        .build();
    assert_data_flow(&run_one(&cluster, job).await, "onClick");
    cluster.shutdown().await;
}

// ── execution-flow, hook call baked into the URL ────────────────────────

fn debug_url(cluster: &FakeCluster) -> String {
    format!("{FIXTURE_BASE}/debug?input={}", cluster.javascript_token().execution_flow_hook())
}

#[tokio::test]
async fn execution_flow_from_url_resource() {
    let (cluster, _http) = start_cluster().await;

    let job = Job::taint_trace(Resource::url(debug_url(&cluster))).build();
    assert_execution_flow(&run_one(&cluster, job).await);
    cluster.shutdown().await;
}

#[tokio::test]
async fn execution_flow_from_response_resource() {
    let (cluster, http) = start_cluster().await;

    let response = http.get(&debug_url(&cluster)).await.expect("fixture fetch");
    let job = Job::taint_trace(Resource::from(response)).build();
    assert_execution_flow(&run_one(&cluster, job).await);
    cluster.shutdown().await;
}

#[tokio::test]
async fn execution_flow_from_page_resource() {
    let (cluster, http) = start_cluster().await;

    let page = Page::from_response(http.get(&debug_url(&cluster)).await.expect("fixture fetch"));
    let job = Job::taint_trace(Resource::from(page)).build();
    assert_execution_flow(&run_one(&cluster, job).await);
    cluster.shutdown().await;
}

// ── cross-variant equivalence and edge cases ────────────────────────────

#[tokio::test]
async fn resource_variants_yield_identical_sinks() {
    let (cluster, http) = start_cluster().await;
    let taint = TaintToken::generate();
    let url = data_trace_url(&taint);

    let response = http.get(&url).await.expect("fixture fetch");
    let page = Page::from_response(response.clone());

    let by_url = run_one(
        &cluster,
        Job::taint_trace(Resource::url(&*url)).taint(taint.clone()).build(),
    )
    .await;
    let by_response = run_one(
        &cluster,
        Job::taint_trace(Resource::from(response)).taint(taint.clone()).build(),
    )
    .await;
    let by_page =
        run_one(&cluster, Job::taint_trace(Resource::from(page)).taint(taint).build()).await;

    assert_eq!(by_url.page.dom, by_response.page.dom);
    assert_eq!(by_response.page.dom, by_page.page.dom);
    cluster.shutdown().await;
}

#[tokio::test]
async fn trace_without_seeding_path_reports_no_findings() {
    // No injector and a resource that does not self-encode the taint:
    // both sinks empty, and that is a success, not an error.
    let (cluster, _http) = start_cluster().await;

    let job = Job::taint_trace(Resource::url(format!("{FIXTURE_BASE}/needs-injector")))
        .taint(TaintToken::generate())
        .build();
    let result = run_one(&cluster, job).await;
    assert!(result.page.dom.is_empty());
    cluster.shutdown().await;
}

#[tokio::test]
async fn generic_load_job_returns_the_page() {
    let (cluster, _http) = start_cluster().await;

    let result = run_one(&cluster, Job::load(Resource::url(format!("{FIXTURE_BASE}/plain")))).await;
    assert_eq!(result.page.url, format!("{FIXTURE_BASE}/plain"));
    assert!(result.page.dom.is_empty());
    cluster.shutdown().await;
}
