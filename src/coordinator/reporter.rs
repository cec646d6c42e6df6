//! Delivers job results back to the coordinator.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::coordinator::protocol::ResultReport;
use crate::http::{HttpClient, HttpRequest};
use crate::job::JobResult;

const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless result sink. Delivery failures are logged and swallowed; the
/// coordinator owns retry and must treat reports idempotently.
pub struct Reporter<C> {
    coordinator_url: String,
    client: C,
}

impl<C: HttpClient> Reporter<C> {
    pub fn new(coordinator_url: impl Into<String>, client: C) -> Self {
        Self {
            coordinator_url: coordinator_url.into(),
            client,
        }
    }

    pub async fn report(&self, job_id: &str, result: &JobResult) {
        let url = format!("{}/worker/jobs/{}/result", self.coordinator_url, job_id);

        let payload = match serde_json::to_vec(&ResultReport::from(result)) {
            Ok(payload) => payload,
            Err(e) => {
                error!(job_id, error = %e, "failed to serialize result report");
                return;
            }
        };

        match self
            .client
            .execute(HttpRequest::post(&url, &payload, REPORT_TIMEOUT))
            .await
        {
            Ok(response) if (200..300).contains(&response.status) => {
                debug!(job_id, "result reported");
            }
            Ok(response) => {
                warn!(job_id, status = response.status, "coordinator rejected result");
            }
            Err(e) => {
                error!(job_id, error = %e, "failed to report result");
            }
        }
    }
}
