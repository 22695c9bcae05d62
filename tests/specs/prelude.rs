//! Shared helpers for the integration specs.

use snare_adapters::{FakeHttp, FakeLauncher};
use snare_cluster::{Cluster, ClusterConfig, JobResult};
use snare_core::{Job, TraceResult};
use std::sync::{Arc, Mutex};

pub type FakeCluster = Cluster<FakeLauncher, FakeHttp>;

/// Base URL of the emulated taint-tracer fixture app.
pub const FIXTURE_BASE: &str = "http://taint-fixture.local";

/// Start a cluster against the default taint-tracer fixtures. The
/// returned `FakeHttp` shares state with the one the cluster fetches
/// through, so specs can pre-fetch responses for resource variants.
pub async fn start_cluster() -> (FakeCluster, FakeHttp) {
    let http = FakeHttp::new();
    let config = ClusterConfig::new().pool_size(2).settle_timeout_ms(200);
    let cluster = Cluster::new(config, FakeLauncher::new(), http.clone())
        .await
        .expect("cluster should start");
    (cluster, http)
}

/// Queue every job, wait for the drain barrier, and return the results
/// in completion order.
pub async fn run_collect(cluster: &FakeCluster, jobs: Vec<Job>) -> Vec<JobResult> {
    let results: Arc<Mutex<Vec<JobResult>>> = Arc::new(Mutex::new(Vec::new()));
    for job in jobs {
        let sink = Arc::clone(&results);
        cluster
            .queue(job, move |result| {
                sink.lock().expect("results mutex poisoned").push(result);
            })
            .expect("queue should accept");
    }
    cluster.wait().await;

    let mut results = results.lock().expect("results mutex poisoned");
    results.drain(..).collect()
}

/// Run a single job and unwrap its successful result.
pub async fn run_one(cluster: &FakeCluster, job: Job) -> TraceResult {
    let mut results = run_collect(cluster, vec![job]).await;
    assert_eq!(results.len(), 1, "expected exactly one result");
    results.remove(0).expect("job should succeed")
}
