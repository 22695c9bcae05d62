// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cluster scheduler: worker pool ownership, FIFO job queue, and the
//! completion/callback protocol.
//!
//! All queue bookkeeping lives behind one mutex that is never held
//! across an await; workers suspend on page execution without blocking
//! each other or the scheduler. Callbacks run on the completing worker's
//! task and must not assume same-thread delivery. Completion is
//! callback-then-decrement, so the `wait` barrier can never open before
//! a callback has run, nor between a callback's follow-up `queue` and
//! its own job's decrement.

use crate::config::ClusterConfig;
use crate::error::{ClusterError, JobError};
use crate::worker::{self, WorkerStatus};
use parking_lot::Mutex;
use snare_adapters::{BrowserEngine, BrowserLauncher, HttpClient};
use snare_core::{Clock, JavascriptToken, Job, JobId, SystemClock, TraceResult};
use std::collections::VecDeque;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a job's callback receives: the harvested result, or the typed
/// failure that ended the job. Delivered exactly once per queued job
/// (except jobs discarded by `shutdown`, which get nothing).
pub type JobResult = Result<TraceResult, JobError>;

type Callback = Box<dyn FnOnce(JobResult) + Send + 'static>;

struct QueuedJob {
    id: JobId,
    job: Job,
    callback: Callback,
}

#[derive(Default)]
struct SchedulerState {
    pending: VecDeque<QueuedJob>,
    outstanding: usize,
    enqueued: u64,
    completed: u64,
    discarded: u64,
    accepting: bool,
}

/// Queue and pool counters.
///
/// Invariant: `pending + outstanding == enqueued - completed - discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterStats {
    pub pending: usize,
    pub outstanding: usize,
    pub enqueued: u64,
    pub completed: u64,
    pub discarded: u64,
}

struct Shared<B, H, C> {
    config: ClusterConfig,
    token: JavascriptToken,
    launcher: B,
    http: H,
    clock: C,
    state: Mutex<SchedulerState>,
    /// Signalled per enqueued job; idle workers park here.
    work: Notify,
    /// Signalled whenever the queue drains; `wait` parks here.
    drained: Notify,
    cancel: CancellationToken,
    statuses: Mutex<Vec<WorkerStatus>>,
}

/// A fixed-size pool of browser-driving workers behind a FIFO queue.
pub struct Cluster<B: BrowserLauncher, H: HttpClient, C: Clock = SystemClock> {
    shared: Arc<Shared<B, H, C>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: BrowserLauncher, H: HttpClient> Cluster<B, H> {
    /// Launch a cluster with the system clock.
    pub async fn new(config: ClusterConfig, launcher: B, http: H) -> Result<Self, ClusterError> {
        Self::with_clock(config, launcher, http, SystemClock).await
    }
}

impl<B: BrowserLauncher, H: HttpClient, C: Clock> Cluster<B, H, C> {
    /// Launch the whole pool upfront; a failed engine launch fails
    /// construction (already-launched engines are torn down again).
    pub async fn with_clock(
        config: ClusterConfig,
        launcher: B,
        http: H,
        clock: C,
    ) -> Result<Self, ClusterError> {
        if config.pool_size == 0 {
            return Err(ClusterError::Config("pool_size must be at least 1".into()));
        }

        let token = JavascriptToken::generate();
        let mut engines = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            match launcher.launch(&token).await {
                Ok(engine) => engines.push(engine),
                Err(err) => {
                    for mut engine in engines {
                        engine.terminate().await;
                    }
                    return Err(ClusterError::Launch(err));
                }
            }
        }

        let pool_size = config.pool_size;
        let shared = Arc::new(Shared {
            config,
            token,
            launcher,
            http,
            clock,
            state: Mutex::new(SchedulerState { accepting: true, ..SchedulerState::default() }),
            work: Notify::new(),
            drained: Notify::new(),
            cancel: CancellationToken::new(),
            statuses: Mutex::new(vec![WorkerStatus::Idle; pool_size]),
        });

        let handles = engines
            .into_iter()
            .enumerate()
            .map(|(slot, engine)| tokio::spawn(run_worker(slot, engine, Arc::clone(&shared))))
            .collect();

        tracing::info!(pool = pool_size, token = %shared.token, "cluster started");
        Ok(Self { shared, handles: Mutex::new(handles) })
    }

    /// The cluster-wide instrumentation token, for callers that build
    /// jobs or URLs referencing the tracer API directly.
    pub fn javascript_token(&self) -> &JavascriptToken {
        &self.shared.token
    }

    /// Append a job to the pending queue. Never blocks. The callback is
    /// invoked exactly once, from whichever worker completes the job.
    pub fn queue(
        &self,
        job: Job,
        callback: impl FnOnce(JobResult) + Send + 'static,
    ) -> Result<JobId, ClusterError> {
        let id = JobId::new();
        {
            let mut state = self.shared.state.lock();
            if !state.accepting {
                return Err(ClusterError::ShutDown);
            }
            state.pending.push_back(QueuedJob {
                id: id.clone(),
                job,
                callback: Box::new(callback),
            });
            state.enqueued += 1;
        }
        tracing::debug!(job_id = %id, "job queued");
        self.shared.work.notify_one();
        Ok(id)
    }

    /// Block until every job ever queued has completed and had its
    /// callback invoked, including jobs enqueued from inside callbacks
    /// while the wait is in progress.
    pub async fn wait(&self) {
        loop {
            let mut drained = pin!(self.shared.drained.notified());
            // Register before checking, or a completion landing between
            // the check and the await is lost.
            drained.as_mut().enable();
            {
                let state = self.shared.state.lock();
                if state.pending.is_empty() && state.outstanding == 0 {
                    return;
                }
            }
            drained.await;
        }
    }

    /// Stop accepting work, discard still-pending jobs without invoking
    /// their callbacks, forcibly terminate every engine (in-flight pages
    /// are not finished gracefully), and join the worker tasks.
    /// Idempotent.
    pub async fn shutdown(&self) {
        let dropped = {
            let mut state = self.shared.state.lock();
            state.accepting = false;
            let dropped = std::mem::take(&mut state.pending);
            state.discarded += dropped.len() as u64;
            dropped
        };
        self.shared.cancel.cancel();

        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            let _ = handle.await;
        }

        if !dropped.is_empty() {
            tracing::info!(discarded = dropped.len(), "pending jobs dropped at shutdown");
        }
        // Release any wait() callers now that the queue can never refill.
        self.shared.drained.notify_waiters();
    }

    /// Snapshot of per-slot worker states.
    pub fn worker_statuses(&self) -> Vec<WorkerStatus> {
        self.shared.statuses.lock().clone()
    }

    pub fn stats(&self) -> ClusterStats {
        let state = self.shared.state.lock();
        ClusterStats {
            pending: state.pending.len(),
            outstanding: state.outstanding,
            enqueued: state.enqueued,
            completed: state.completed,
            discarded: state.discarded,
        }
    }
}

/// One worker task: park on the queue, run jobs, replace the engine
/// when it is lost. The slot index is stable for the cluster lifetime.
async fn run_worker<B: BrowserLauncher, H: HttpClient, C: Clock>(
    slot: usize,
    mut engine: Box<dyn BrowserEngine>,
    shared: Arc<Shared<B, H, C>>,
) {
    while let Some(next) = next_assignment(&shared).await {
        set_status(&shared, slot, WorkerStatus::Busy);
        let QueuedJob { id, job, callback } = next;
        tracing::debug!(slot, job_id = %id, kind = %job.kind, resource = %job.resource, "job assigned");

        let started = shared.clock.now();
        let outcome = {
            let run = worker::execute_job(
                engine.as_mut(),
                &shared.http,
                &shared.token,
                shared.config.settle_budget(),
                &job,
            );
            tokio::select! {
                _ = shared.cancel.cancelled() => None,
                outcome = run => Some(outcome),
            }
        };
        let Some(outcome) = outcome else {
            // Forcible shutdown mid-job: the engine is killed, the
            // callback is never invoked, the job counts as discarded.
            engine.terminate().await;
            set_status(&shared, slot, WorkerStatus::Dead);
            let mut state = shared.state.lock();
            state.outstanding = state.outstanding.saturating_sub(1);
            state.discarded += 1;
            return;
        };

        let elapsed_ms =
            shared.clock.now().saturating_duration_since(started).as_millis() as u64;
        let engine_lost = matches!(&outcome, Err(JobError::EngineCrash(_)));
        let recycle = matches!(&outcome, Err(JobError::SettleTimeout(_)));
        match &outcome {
            Ok(_) => tracing::info!(slot, job_id = %id, elapsed_ms, "job completed"),
            Err(err) => tracing::warn!(slot, job_id = %id, elapsed_ms, error = %err, "job failed"),
        }

        let outcome =
            outcome.map(|page| TraceResult { job_id: id.clone(), page, elapsed_ms });
        callback(outcome);
        complete(&shared);

        if engine_lost {
            set_status(&shared, slot, WorkerStatus::Dead);
            engine.terminate().await;
            match respawn(&shared, slot).await {
                Some(fresh) => engine = fresh,
                None => return,
            }
        } else if recycle {
            // Potentially unstable after a settle timeout; swap the
            // engine without marking the slot dead.
            engine.terminate().await;
            match respawn(&shared, slot).await {
                Some(fresh) => engine = fresh,
                None => {
                    set_status(&shared, slot, WorkerStatus::Dead);
                    return;
                }
            }
        }
        set_status(&shared, slot, WorkerStatus::Idle);
    }

    engine.terminate().await;
    set_status(&shared, slot, WorkerStatus::Dead);
}

/// Pop the queue head, or park until there is one. Returns `None` once
/// the cluster is cancelled.
async fn next_assignment<B, H, C>(shared: &Shared<B, H, C>) -> Option<QueuedJob> {
    loop {
        let notified = shared.work.notified();
        {
            let mut state = shared.state.lock();
            if let Some(next) = state.pending.pop_front() {
                state.outstanding += 1;
                return Some(next);
            }
        }
        tokio::select! {
            _ = shared.cancel.cancelled() => return None,
            _ = notified => {}
        }
    }
}

/// Post-callback bookkeeping: count the completion and release the
/// drain barrier if this emptied the cluster.
fn complete<B, H, C>(shared: &Shared<B, H, C>) {
    let empty = {
        let mut state = shared.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        state.completed += 1;
        state.pending.is_empty() && state.outstanding == 0
    };
    if empty {
        shared.drained.notify_waiters();
    }
}

fn set_status<B, H, C>(shared: &Shared<B, H, C>, slot: usize, status: WorkerStatus) {
    let mut statuses = shared.statuses.lock();
    if let Some(entry) = statuses.get_mut(slot) {
        *entry = status;
    }
}

/// Launch a replacement engine for a slot, backing off between failed
/// attempts until shutdown interrupts.
async fn respawn<B: BrowserLauncher, H, C>(
    shared: &Shared<B, H, C>,
    slot: usize,
) -> Option<Box<dyn BrowserEngine>> {
    let mut backoff = shared.config.relaunch_backoff();
    loop {
        if shared.cancel.is_cancelled() {
            return None;
        }
        match shared.launcher.launch(&shared.token).await {
            Ok(engine) => {
                tracing::info!(slot, "engine respawned");
                return Some(engine);
            }
            Err(err) => {
                tracing::warn!(slot, error = %err, backoff_ms = backoff.as_millis() as u64, "engine relaunch failed");
                tokio::select! {
                    _ = shared.cancel.cancelled() => return None,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(Duration::from_secs(5));
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
