use thiserror::Error;

/// Transport-level failures from a single outbound HTTP attempt.
///
/// The set is closed: every variant maps to a stable kind string that is
/// reported back to the coordinator via [`kind`](TransportError::kind).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("url has no host: {0}")]
    NoHost(String),

    #[error("failed to open connection: {0}")]
    RequestFailed(String),

    #[error("failed to send request: {0}")]
    SendFailed(String),

    #[error("failed to receive response: {0}")]
    ReceiveFailed(String),

    #[error("failed to read response body: {0}")]
    ReadFailed(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl TransportError {
    /// Stable identifier carried in the `error` field of a result report.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl(_) => "InvalidUrl",
            TransportError::NoHost(_) => "NoHost",
            TransportError::RequestFailed(_) => "RequestFailed",
            TransportError::SendFailed(_) => "SendFailed",
            TransportError::ReceiveFailed(_) => "ReceiveFailed",
            TransportError::ReadFailed(_) => "ReadFailed",
            TransportError::Timeout(_) => "Timeout",
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed coordinator payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unexpected coordinator status {0}")]
    UnexpectedStatus(u16),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
