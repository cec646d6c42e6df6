//! Pulls pending jobs from the coordinator on a wall-clock-aligned cadence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::coordinator::protocol::PollEnvelope;
use crate::error::{Result, WorkerError};
use crate::http::{HttpClient, HttpRequest};
use crate::job::Job;
use crate::queue::{JobQueue, PushError};

/// Timeout for poll requests to the coordinator itself.
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Floor for the inter-poll sleep, so a jitter landing in the past cannot
/// spin the loop.
const MIN_POLL_SLEEP_MS: i64 = 100;

pub struct Poller<C> {
    coordinator_url: String,
    worker_id: String,
    region: String,
    jobs_per_pull: u32,
    poll_interval_secs: u64,
    max_jitter_ms: u64,
    production: bool,
    client: C,
    queue: Arc<JobQueue>,
}

impl<C: HttpClient> Poller<C> {
    pub fn new(config: &WorkerConfig, client: C, queue: Arc<JobQueue>) -> Self {
        Self {
            coordinator_url: config.coordinator_url.clone(),
            worker_id: config.worker_id.clone(),
            region: config.region.clone(),
            jobs_per_pull: config.jobs_per_pull,
            poll_interval_secs: config.poll_interval_secs,
            max_jitter_ms: config.max_jitter_ms,
            production: config.production,
            client,
            queue,
        }
    }

    /// Poll until cancelled. Every failure mode degrades to an empty batch;
    /// only cancellation stops the loop.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            coordinator = %self.coordinator_url,
            worker_id = %self.worker_id,
            region = %self.region,
            interval_secs = self.poll_interval_secs,
            "poller started"
        );

        while !shutdown.is_cancelled() {
            let batch = match self.poll_once().await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(error = %e, "poll failed, treating as empty batch");
                    Vec::new()
                }
            };

            for job in batch {
                match self.queue.try_push(job).await {
                    Ok(()) => {}
                    Err(PushError::Full(job)) => {
                        warn!(job_id = %job.id, "queue full, dropping job for coordinator to re-offer");
                    }
                    Err(PushError::Closed(job)) => {
                        warn!(job_id = %job.id, "queue closed, dropping job");
                    }
                }
            }

            let delay = self.next_poll_delay();
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("poller stopped");
    }

    async fn poll_once(&self) -> Result<Vec<Job>> {
        let url = format!(
            "{}/worker/jobs?worker_id={}&region={}&limit={}",
            self.coordinator_url, self.worker_id, self.region, self.jobs_per_pull
        );

        let response = self
            .client
            .execute(HttpRequest::get(&url, POLL_TIMEOUT))
            .await?;

        match response.status {
            204 => {
                debug!("no pending jobs");
                Ok(Vec::new())
            }
            200 => self.parse_offer(&response.body),
            status => Err(WorkerError::UnexpectedStatus(status)),
        }
    }

    /// Parse a 200 offer into a batch. A job the worker cannot represent is
    /// skipped rather than fatal; the coordinator re-offers anything this
    /// worker never claims.
    fn parse_offer(&self, body: &[u8]) -> Result<Vec<Job>> {
        let envelope: PollEnvelope = serde_json::from_slice(body)?;

        if !envelope.success {
            return Ok(Vec::new());
        }
        let Some(payload) = envelope.job else {
            return Ok(Vec::new());
        };

        let method = match payload.method.parse() {
            Ok(method) => method,
            Err(()) => {
                warn!(job_id = %payload.id, method = %payload.method, "unrecognized method, skipping job");
                return Ok(Vec::new());
            }
        };

        let mut target_url = payload.target_url;
        if !self.production && target_url.starts_with("https://") {
            warn!(job_id = %payload.id, "downgrading https target to http outside production");
            target_url = target_url.replacen("https://", "http://", 1);
        }

        debug!(job_id = %payload.id, method = %method, "job received");
        Ok(vec![Job::new(
            payload.id,
            target_url,
            method,
            payload.body.map(String::into_bytes),
        )])
    }

    fn next_poll_delay(&self) -> Duration {
        let jitter_ms = if self.max_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.max_jitter_ms)
        } else {
            0
        };
        let now_ms = Utc::now().timestamp_millis();
        Duration::from_millis(aligned_delay_ms(
            now_ms,
            self.poll_interval_secs,
            jitter_ms,
        ))
    }
}

/// Delay from `now_ms` to the next aligned poll instant: the wall-clock
/// second boundary `poll_interval_secs` ahead, plus the caller's jitter.
fn aligned_delay_ms(now_ms: i64, poll_interval_secs: u64, jitter_ms: u64) -> u64 {
    let next_ms = (now_ms.div_euclid(1000) + poll_interval_secs as i64) * 1000 + jitter_ms as i64;
    (next_ms - now_ms).max(MIN_POLL_SLEEP_MS) as u64
}
