//! Per-host politeness budget for outbound requests.
//!
//! Each host gets at most one request every `1 / rate_limit_per_second`
//! seconds, measured from the previous send. The limiter keys on the URL's
//! host component only: ports and schemes share a budget.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Entries idle longer than this are dropped by the maintenance sweep.
pub const STALE_HOST_TTL: Duration = Duration::from_secs(60 * 60);

pub struct HostRateLimiter {
    last_send: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
}

impl HostRateLimiter {
    pub fn new(rate_limit_per_second: f64) -> Self {
        let min_interval = if rate_limit_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / rate_limit_per_second)
        } else {
            Duration::from_secs(1)
        };
        Self::with_min_interval(min_interval)
    }

    pub fn with_min_interval(min_interval: Duration) -> Self {
        Self {
            last_send: Mutex::new(HashMap::new()),
            min_interval,
        }
    }

    /// True iff a send to `host` would be admitted right now. Unseen hosts
    /// are always admitted.
    pub async fn can_send(&self, host: &str) -> bool {
        let last_send = self.last_send.lock().await;
        match last_send.get(host) {
            Some(last) => last.elapsed() >= self.min_interval,
            None => true,
        }
    }

    /// Block until `host` is eligible, then claim its slot.
    ///
    /// The wait is computed analytically from the recorded timestamp and
    /// slept exactly once per contender. Claiming (writing `now` before
    /// returning) serializes concurrent waiters on the same host; the
    /// subsequent [`record_send`](Self::record_send) moves the clock again
    /// once the request has completed.
    pub async fn wait_for_host(&self, host: &str) {
        loop {
            let wait = {
                let mut last_send = self.last_send.lock().await;
                let now = Instant::now();
                match last_send.get(host) {
                    Some(last) => {
                        let elapsed = now.duration_since(*last);
                        if elapsed >= self.min_interval {
                            last_send.insert(host.to_string(), now);
                            None
                        } else {
                            Some(self.min_interval - elapsed)
                        }
                    }
                    None => {
                        last_send.insert(host.to_string(), now);
                        None
                    }
                }
            };

            match wait {
                None => return,
                Some(wait) => {
                    debug!(host, wait_ms = wait.as_millis() as u64, "host budget exhausted, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Record a completed send. Called after the request finishes (success
    /// or failure) so the next send waits request duration plus the minimum
    /// interval.
    pub async fn record_send(&self, host: &str) {
        let mut last_send = self.last_send.lock().await;
        last_send.insert(host.to_string(), Instant::now());
    }

    /// Drop hosts not sent to within `ttl`. Returns the number removed.
    pub async fn prune_stale(&self, ttl: Duration) -> usize {
        let mut last_send = self.last_send.lock().await;
        let before = last_send.len();
        last_send.retain(|_, last| last.elapsed() < ttl);
        before - last_send.len()
    }

    /// Number of hosts currently tracked.
    pub async fn tracked_hosts(&self) -> usize {
        self.last_send.lock().await.len()
    }
}

/// Extract the rate-limiting key from a target URL: the lowercased host
/// component. Fails before any outbound attempt, so the executor can report
/// unusable URLs without consulting the limiter.
///
/// Host presence is checked before the scheme: a hostless URI such as
/// `mailto:` or `data:` reports `NoHost`, while a non-http scheme with a
/// host reports `InvalidUrl`. Empty-host http URLs never get this far —
/// the parser rejects them outright.
pub fn extract_host(target_url: &str) -> Result<String, TransportError> {
    let url =
        Url::parse(target_url).map_err(|_| TransportError::InvalidUrl(target_url.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| TransportError::NoHost(target_url.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(TransportError::InvalidUrl(target_url.to_string()));
    }
    Ok(host.to_ascii_lowercase())
}
