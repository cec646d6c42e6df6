//! Wire types for the two coordinator endpoints.

use serde::{Deserialize, Serialize};

use crate::job::JobResult;

/// Body of a 200 response from `GET /worker/jobs`.
///
/// Defensive throughout: a missing `success` or `job` field parses to an
/// empty offer rather than an error.
#[derive(Debug, Deserialize)]
pub struct PollEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job: Option<JobPayload>,
}

/// Job descriptor as offered by the coordinator. `body` may be a string,
/// null, or absent; the latter two both map to `None`. `timeout_ms` is not
/// transported and defaults worker-side.
#[derive(Debug, Deserialize)]
pub struct JobPayload {
    pub id: String,
    pub target_url: String,
    pub method: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Body POSTed to `{base}/worker/jobs/{id}/result`.
#[derive(Debug, Serialize)]
pub struct ResultReport {
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_body: String,
    pub error: Option<&'static str>,
    pub execution_time_ms: u64,
}

impl From<&JobResult> for ResultReport {
    fn from(result: &JobResult) -> Self {
        Self {
            success: result.success,
            status_code: result.status_code,
            response_body: String::from_utf8_lossy(&result.body).into_owned(),
            error: result.error_kind,
            execution_time_ms: result.execution_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_job_parses() {
        let envelope: PollEnvelope = serde_json::from_str(
            r#"{"success":true,"job":{"id":"j1","target_url":"http://t.example/ok","method":"GET","body":null}}"#,
        )
        .unwrap();
        assert!(envelope.success);
        let job = envelope.job.unwrap();
        assert_eq!(job.id, "j1");
        assert_eq!(job.method, "GET");
        assert!(job.body.is_none());
    }

    #[test]
    fn envelope_body_string_null_absent() {
        let with_body: PollEnvelope = serde_json::from_str(
            r#"{"success":true,"job":{"id":"a","target_url":"http://x/","method":"POST","body":"{\"k\":1}"}}"#,
        )
        .unwrap();
        assert_eq!(with_body.job.unwrap().body.as_deref(), Some(r#"{"k":1}"#));

        let null_body: PollEnvelope = serde_json::from_str(
            r#"{"success":true,"job":{"id":"b","target_url":"http://x/","method":"GET","body":null}}"#,
        )
        .unwrap();
        assert!(null_body.job.unwrap().body.is_none());

        let absent_body: PollEnvelope = serde_json::from_str(
            r#"{"success":true,"job":{"id":"c","target_url":"http://x/","method":"GET"}}"#,
        )
        .unwrap();
        assert!(absent_body.job.unwrap().body.is_none());
    }

    #[test]
    fn envelope_missing_fields_degrade_to_empty() {
        let no_success: PollEnvelope = serde_json::from_str(r#"{"job":null}"#).unwrap();
        assert!(!no_success.success);

        let no_job: PollEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(no_job.job.is_none());

        let empty: PollEnvelope = serde_json::from_str(r#"{}"#).unwrap();
        assert!(!empty.success);
        assert!(empty.job.is_none());
    }

    #[test]
    fn report_serializes_error_kind_as_null_when_absent() {
        let result = JobResult::from_response(500, b"boom".to_vec(), 12);
        let report = ResultReport::from(&result);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status_code"], 500);
        assert_eq!(json["response_body"], "boom");
        assert_eq!(json["error"], serde_json::Value::Null);
        assert_eq!(json["execution_time_ms"], 12);
    }
}
