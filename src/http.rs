//! Outbound HTTP primitive.
//!
//! A thin, stateless client behind the [`HttpClient`] trait so that the
//! poller, executor, and reporter can be exercised against test doubles.
//! The production implementation wraps a pooled `reqwest::Client`.

use std::future::Future;
use std::time::Duration;

use tracing::{trace, warn};

use crate::error::TransportError;
use crate::job::{HttpMethod, USER_AGENT};

/// Hard cap on buffered response bodies. Reads beyond this fail the job.
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// One outbound request. Borrows from the owning job; the response buffer
/// is owned by the caller.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub headers: &'a [(String, String)],
    pub body: Option<&'a [u8]>,
    pub timeout: Duration,
}

impl<'a> HttpRequest<'a> {
    pub fn get(url: &'a str, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: &[],
            body: None,
            timeout,
        }
    }

    pub fn post(url: &'a str, body: &'a [u8], timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: &[],
            body: Some(body),
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Issues a single request and buffers the full response.
pub trait HttpClient: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest<'_>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Production client. Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build the shared client. Timeouts are applied per request; the
    /// builder only sets connection-level defaults.
    pub fn new() -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest<'_>) -> Result<HttpResponse, TransportError> {
        let timeout_ms = request.timeout.as_millis() as u64;

        let url = reqwest::Url::parse(request.url)
            .map_err(|_| TransportError::InvalidUrl(request.url.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TransportError::InvalidUrl(request.url.to_string()));
        }

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .timeout(request.timeout);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            if !body.is_empty() {
                builder = builder
                    .header("Content-Type", "application/json")
                    .body(body.to_vec());
            }
        }

        trace!(url = request.url, method = %request.method, "sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout_ms)
            } else if e.is_connect() {
                TransportError::RequestFailed(e.to_string())
            } else {
                TransportError::SendFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = read_capped(response, timeout_ms).await?;

        trace!(
            url = request.url,
            status,
            bytes = body.len(),
            "response received"
        );

        Ok(HttpResponse { status, body })
    }
}

/// Stream the body into an owned buffer, failing once the cap is exceeded.
/// Exactly [`MAX_RESPONSE_BYTES`] is accepted; one byte more is not.
async fn read_capped(
    mut response: reqwest::Response,
    timeout_ms: u64,
) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();

    loop {
        let chunk = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout_ms)
            } else {
                TransportError::ReceiveFailed(e.to_string())
            }
        })?;

        let Some(chunk) = chunk else {
            return Ok(body);
        };

        if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
            warn!(
                received = body.len() + chunk.len(),
                cap = MAX_RESPONSE_BYTES,
                "response body exceeds cap"
            );
            return Err(TransportError::ReadFailed(format!(
                "response body exceeds {} byte cap",
                MAX_RESPONSE_BYTES
            )));
        }
        body.extend_from_slice(&chunk);
    }
}
