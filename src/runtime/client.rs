//! Runtime API HTTP client.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{AdapterError, ErrorDocument};

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";

/// Errors talking to the Runtime API.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("runtime API returned an invocation without a request id")]
    MissingRequestId,

    #[error("runtime API rejected {what} with status {status}")]
    Rejected { what: &'static str, status: u16 },
}

/// One pending invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    pub deadline_ms: Option<u64>,
    pub trace_id: Option<String>,
    pub event: Value,
}

/// Client for the Lambda Runtime API.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` from `AWS_LAMBDA_RUNTIME_API`.
    pub fn new(api: &str) -> Self {
        Self {
            // Long polls on /next must not time out client-side.
            http: reqwest::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_default(),
            base: format!("http://{api}/{API_VERSION}/runtime"),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    /// Block until the platform hands over the next event.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let response = self
            .http
            .get(format!("{}/invocation/next", self.base))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RuntimeError::Rejected {
                what: "next invocation",
                status: response.status().as_u16(),
            });
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let request_id = header(REQUEST_ID_HEADER).ok_or(RuntimeError::MissingRequestId)?;
        let deadline_ms = header(DEADLINE_HEADER).and_then(|v| v.parse().ok());
        let trace_id = header(TRACE_ID_HEADER);

        let event = response.json::<Value>().await?;
        tracing::debug!(request_id = %request_id, deadline_ms = ?deadline_ms, "Invocation received");

        Ok(Invocation {
            request_id,
            deadline_ms,
            trace_id,
            event,
        })
    }

    pub async fn send_response<T: Serialize + ?Sized>(
        &self,
        request_id: &str,
        body: &T,
    ) -> Result<(), RuntimeError> {
        let response = self
            .http
            .post(format!("{}/invocation/{request_id}/response", self.base))
            .json(body)
            .send()
            .await?;
        check(response.status(), "invocation response")
    }

    pub async fn send_error(&self, request_id: &str, err: &AdapterError) -> Result<(), RuntimeError> {
        let document = ErrorDocument::from(err);
        let response = self
            .http
            .post(format!("{}/invocation/{request_id}/error", self.base))
            .header(ERROR_TYPE_HEADER, format!("Runtime.{}", document.error_type))
            .json(&document)
            .send()
            .await?;
        check(response.status(), "invocation error")
    }

    /// Report a failure that happened before the first invocation.
    pub async fn send_init_error(&self, error_type: &str, message: &str) -> Result<(), RuntimeError> {
        let document = ErrorDocument {
            error_type: error_type.to_string(),
            error_message: message.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/init/error", self.base))
            .header(ERROR_TYPE_HEADER, format!("Runtime.{error_type}"))
            .json(&document)
            .send()
            .await?;
        check(response.status(), "init error")
    }
}

fn check(status: reqwest::StatusCode, what: &'static str) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Rejected {
            what,
            status: status.as_u16(),
        })
    }
}
