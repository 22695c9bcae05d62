//! Queue/wait/shutdown specs for the cluster surface.

use crate::prelude::*;
use snare_cluster::{ClusterError, JobError};
use snare_core::{Job, Resource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn load_job(path: &str) -> Job {
    Job::load(Resource::url(format!("{FIXTURE_BASE}{path}")))
}

#[tokio::test]
async fn wait_returns_after_every_callback_ran() {
    let (cluster, _http) = start_cluster().await;

    let results = run_collect(&cluster, (0..8).map(|i| load_job(&format!("/p{i}"))).collect()).await;
    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| r.is_ok()));

    let stats = cluster.stats();
    assert_eq!(stats.enqueued, 8);
    assert_eq!(stats.completed, 8);
    assert_eq!(stats.pending + stats.outstanding, 0);
    cluster.shutdown().await;
}

#[tokio::test]
async fn wait_drains_work_enqueued_during_the_wait_window() {
    let (cluster, _http) = start_cluster().await;
    let cluster = Arc::new(cluster);
    let depth = Arc::new(AtomicUsize::new(0));

    // Each callback enqueues a follow-up, three levels deep; one wait()
    // call has to cover all of them.
    fn chain(cluster: Arc<FakeCluster>, depth: Arc<AtomicUsize>, level: usize) {
        let job = Job::load(Resource::url(format!("{FIXTURE_BASE}/chain-{level}")));
        let inner = Arc::clone(&cluster);
        cluster
            .queue(job, move |_| {
                depth.fetch_add(1, Ordering::SeqCst);
                if level < 3 {
                    chain(Arc::clone(&inner), depth, level + 1);
                }
            })
            .expect("queue should accept");
    }

    chain(Arc::clone(&cluster), Arc::clone(&depth), 1);
    cluster.wait().await;

    assert_eq!(depth.load(Ordering::SeqCst), 3);
    cluster.shutdown().await;
}

#[tokio::test]
async fn failed_jobs_are_reported_through_the_callback() {
    let (cluster, http) = start_cluster().await;
    http.fail_matching("/unreachable");

    let mut results = run_collect(&cluster, vec![load_job("/unreachable")]).await;
    let err = results.remove(0).expect_err("fetch should fail");
    assert!(matches!(err, JobError::ResourceLoad(_)), "got: {err:?}");
    cluster.shutdown().await;
}

#[tokio::test]
async fn shutdown_rejects_further_queueing() {
    let (cluster, _http) = start_cluster().await;
    cluster.shutdown().await;

    let err = cluster.queue(load_job("/late"), |_| {}).expect_err("queue should reject");
    assert!(matches!(err, ClusterError::ShutDown));

    // And again: shutdown is idempotent.
    cluster.shutdown().await;
}

#[tokio::test]
async fn results_arrive_in_completion_order_not_submission_order() {
    // With several workers the completion order is a permutation of the
    // submission order; the drain barrier holds either way.
    let (cluster, _http) = start_cluster().await;

    let results =
        run_collect(&cluster, (0..6).map(|i| load_job(&format!("/perm-{i}"))).collect()).await;
    let mut urls: Vec<String> =
        results.into_iter().map(|r| r.expect("load should succeed").page.url).collect();
    urls.sort();

    let mut expected: Vec<String> =
        (0..6).map(|i| format!("{FIXTURE_BASE}/perm-{i}")).collect();
    expected.sort();
    assert_eq!(urls, expected);
    cluster.shutdown().await;
}
