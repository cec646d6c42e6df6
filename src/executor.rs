//! Executor pool: drains the job queue and performs the outbound requests.
//!
//! Each worker task loops pop → gate on the limiter → execute → report →
//! record. Nothing a job does can take a worker down; every failure is
//! captured into a [`JobResult`] and reported. Retries are the
//! coordinator's decision, not ours.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coordinator::Reporter;
use crate::http::{HttpClient, HttpRequest};
use crate::job::{Job, JobResult};
use crate::limiter::{extract_host, HostRateLimiter};
use crate::queue::JobQueue;

pub struct ExecutorPool<C> {
    queue: Arc<JobQueue>,
    limiter: Arc<HostRateLimiter>,
    reporter: Arc<Reporter<C>>,
    client: C,
}

impl<C> ExecutorPool<C>
where
    C: HttpClient + Clone + 'static,
{
    pub fn new(
        queue: Arc<JobQueue>,
        limiter: Arc<HostRateLimiter>,
        reporter: Arc<Reporter<C>>,
        client: C,
    ) -> Self {
        Self {
            queue,
            limiter,
            reporter,
            client,
        }
    }

    /// Spawn `count` long-lived worker tasks. Each terminates once the
    /// queue is closed and drained.
    pub fn spawn(&self, count: usize) -> Vec<JoinHandle<()>> {
        (0..count)
            .map(|worker| {
                let queue = self.queue.clone();
                let limiter = self.limiter.clone();
                let reporter = self.reporter.clone();
                let client = self.client.clone();
                tokio::spawn(async move {
                    debug!(worker, "executor started");
                    while let Some(job) = queue.pop().await {
                        execute_one(job, &limiter, &client, &reporter).await;
                    }
                    debug!(worker, "executor stopped");
                })
            })
            .collect()
    }
}

/// Run one job to completion. Takes the job by value: its id, url, and body
/// buffers are owned here and dropped together when the report is done.
async fn execute_one<C: HttpClient>(
    job: Job,
    limiter: &HostRateLimiter,
    client: &C,
    reporter: &Reporter<C>,
) {
    // Unusable targets are reported without ever touching the limiter or
    // the network.
    let host = match extract_host(&job.target_url) {
        Ok(host) => host,
        Err(e) => {
            warn!(job_id = %job.id, url = %job.target_url, error = %e, "job target unusable");
            reporter
                .report(&job.id, &JobResult::from_error(e.kind(), 0))
                .await;
            return;
        }
    };

    limiter.wait_for_host(&host).await;

    let request = HttpRequest {
        method: job.method,
        url: &job.target_url,
        headers: &job.headers,
        body: job.body.as_deref(),
        timeout: Duration::from_millis(job.timeout_ms),
    };

    let started = Instant::now();
    let outcome = client.execute(request).await;
    let execution_time_ms = started.elapsed().as_millis() as u64;

    let result = match outcome {
        Ok(response) => {
            JobResult::from_response(response.status, response.body, execution_time_ms)
        }
        Err(e) => {
            warn!(job_id = %job.id, host = %host, error = %e, "job request failed");
            JobResult::from_error(e.kind(), execution_time_ms)
        }
    };

    info!(
        job_id = %job.id,
        success = result.success,
        status = ?result.status_code,
        execution_time_ms,
        "job executed"
    );

    reporter.report(&job.id, &result).await;
    limiter.record_send(&host).await;
}
