use std::str::FromStr;

/// Identity sent with every outbound request.
pub const USER_AGENT: &str = "EZworker/1.0";
pub const ACCEPT: &str = "application/json";

/// Applied when the coordinator does not transport a timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Patch => write!(f, "PATCH"),
        }
    }
}

/// A single unit of work: one outbound HTTP request on behalf of the
/// coordinator. Immutable once constructed; the job and all its buffers are
/// owned as a unit and move Poller → Queue → Executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub target_url: String,
    pub method: HttpMethod,
    pub body: Option<Vec<u8>>,
    pub timeout_ms: u64,
    pub headers: Vec<(String, String)>,
}

impl Job {
    /// Build a job with the fixed identification headers attached.
    pub fn new(id: String, target_url: String, method: HttpMethod, body: Option<Vec<u8>>) -> Self {
        Self {
            id,
            target_url,
            method,
            body,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: vec![
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Accept".to_string(), ACCEPT.to_string()),
            ],
        }
    }
}

/// Outcome of executing one job, as reported to the coordinator.
///
/// `success` reflects the HTTP status alone: a 500 from the target is a
/// failed result without an error kind, while a transport error carries a
/// kind and no status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub body: Vec<u8>,
    pub error_kind: Option<&'static str>,
    pub execution_time_ms: u64,
}

impl JobResult {
    pub fn from_response(status: u16, body: Vec<u8>, execution_time_ms: u64) -> Self {
        Self {
            success: (200..300).contains(&status),
            status_code: Some(status),
            body,
            error_kind: None,
            execution_time_ms,
        }
    }

    pub fn from_error(error_kind: &'static str, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            status_code: None,
            body: Vec::new(),
            error_kind: Some(error_kind),
            execution_time_ms,
        }
    }
}
