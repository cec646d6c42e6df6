//! Orchestrator: owns every component and drives the lifecycle.
//!
//! Wiring is strictly one-way — Poller → Queue → ExecutorPool →
//! (HttpClient, HostRateLimiter) → Reporter — and nothing reaches back up
//! into the worker. Shutdown stops the poller first, then closes the queue
//! so executors drain, letting in-flight requests complete.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::WorkerConfig;
use crate::coordinator::{Poller, Reporter};
use crate::executor::ExecutorPool;
use crate::http::HttpClient;
use crate::limiter::{HostRateLimiter, STALE_HOST_TTL};
use crate::queue::JobQueue;

/// Cadence of the rate-limiter stale-host sweep.
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

pub struct Worker<C> {
    config: WorkerConfig,
    client: C,
}

impl<C> Worker<C>
where
    C: HttpClient + Clone + 'static,
{
    pub fn new(config: WorkerConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Run until the shutdown token is cancelled, then drain and join every
    /// task. Shutdown latency is bounded by the slowest in-flight request's
    /// remaining timeout plus one poll slice.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            worker_id = %self.config.worker_id,
            region = %self.config.region,
            executors = self.config.executor_count,
            "worker running"
        );

        let queue = Arc::new(JobQueue::new(self.config.queue_capacity));
        let limiter = Arc::new(HostRateLimiter::new(self.config.rate_limit_per_second));
        let reporter = Arc::new(Reporter::new(
            self.config.coordinator_url.clone(),
            self.client.clone(),
        ));

        let pool = ExecutorPool::new(
            queue.clone(),
            limiter.clone(),
            reporter,
            self.client.clone(),
        );
        let executors = pool.spawn(self.config.executor_count);

        let poller = Poller::new(&self.config, self.client.clone(), queue.clone());
        let poller_handle = tokio::spawn(poller.run(shutdown.clone()));

        let sweep_limiter = limiter.clone();
        let sweeper = tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = sweep_limiter.prune_stale(STALE_HOST_TTL).await;
                if removed > 0 {
                    debug!(removed, "pruned idle hosts from rate limiter");
                }
            }
        });

        shutdown.cancelled().await;
        info!("worker stopping");

        // Poller first so nothing new is pulled, then the queue so blocked
        // executors unblock once the backlog drains.
        if let Err(e) = poller_handle.await {
            error!(error = %e, "poller task failed");
        }
        queue.close().await;
        for handle in executors {
            if let Err(e) = handle.await {
                error!(error = %e, "executor task failed");
            }
        }
        sweeper.abort();

        info!("worker stopped");
    }
}
