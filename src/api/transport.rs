use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Message used for connection-level failures, matching what browser clients report
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartFile),
}

/// A single file part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartFile {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A request with client defaults already merged in, ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub data: Value,
}

/// Failure as seen by the transport. `response` is present when the server
/// answered with a non-success status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub message: String,
    pub response: Option<TransportResponse>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(message: impl Into<String>, response: TransportResponse) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
        }
    }
}

/// Wire-level seam of the HTTP client.
///
/// Implementations resolve `Ok` only for 2xx responses; any other status is
/// reported as a `TransportError` carrying the decoded response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(default_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(default_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        let timeout = request.timeout;
        let is_multipart = matches!(request.body, RequestBody::Multipart(_));

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .timeout(timeout);

        for (name, value) in &request.headers {
            // reqwest writes its own multipart content type with the boundary
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(|e| TransportError::new(e.to_string()))?;
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| describe_reqwest_error(&e, timeout))?;

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            // An error status still wins over a broken body
            Err(e) if !status.is_success() => {
                debug!("Failed to read {} body: {}", status, e);
                return Err(status_error(status.as_u16(), Value::Null));
            }
            Err(e) => return Err(describe_reqwest_error(&e, timeout)),
        };
        let data = decode_body(&bytes);

        debug!("Received {} ({} bytes)", status, bytes.len());

        if status.is_success() {
            Ok(TransportResponse {
                status: status.as_u16(),
                data,
            })
        } else {
            Err(status_error(status.as_u16(), data))
        }
    }
}

fn status_error(status: u16, data: Value) -> TransportError {
    TransportError::with_response(
        format!("Request failed with status code {}", status),
        TransportResponse { status, data },
    )
}

fn describe_reqwest_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::new(format!("timeout of {}ms exceeded", timeout.as_millis()))
    } else if error.is_connect() {
        TransportError::new(NETWORK_ERROR_MESSAGE)
    } else {
        TransportError::new(error.to_string())
    }
}

/// JSON when possible, raw text otherwise, `null` for an empty body
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Replays a canned outcome and records every request it is handed
    pub(crate) struct FakeTransport {
        outcome: Result<TransportResponse, TransportError>,
        pub(crate) requests: Mutex<Vec<PreparedRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn ok(data: Value) -> Self {
            Self::replying(Ok(TransportResponse { status: 200, data }))
        }

        pub(crate) fn failing(error: TransportError) -> Self {
            Self::replying(Err(error))
        }

        fn replying(outcome: Result<TransportResponse, TransportError>) -> Self {
            Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_request(&self) -> Option<PreparedRequest> {
            self.requests.lock().unwrap().last().cloned()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }
}
