use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::transport::{PreparedRequest, RequestBody, Transport, TransportError, TransportResponse};
use crate::error::{ApiError, FALLBACK_ERROR_MESSAGE};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Settings shared by every request issued through an `HttpClient`
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDefaults {
    pub base_url: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl ClientDefaults {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            headers: vec![(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string())],
        }
    }
}

/// Per-call request description. Unset fields fall back to `ClientDefaults`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            headers: Vec::new(),
            body,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Hook applied to every outgoing request before defaults are merged in
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, config: RequestConfig) -> Result<RequestConfig, ApiError>;
}

/// Hook applied to every transport outcome before it reaches the caller
pub trait ResponseInterceptor: Send + Sync {
    fn on_success(&self, response: TransportResponse) -> Result<Value, ApiError>;
    fn on_error(&self, error: TransportError) -> ApiError;
}

/// Leaves requests untouched
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn on_request(&self, config: RequestConfig) -> Result<RequestConfig, ApiError> {
        Ok(config)
    }
}

/// Returns only the response payload and flattens failures into one message
pub struct UnwrapData;

impl ResponseInterceptor for UnwrapData {
    fn on_success(&self, response: TransportResponse) -> Result<Value, ApiError> {
        Ok(response.data)
    }

    fn on_error(&self, error: TransportError) -> ApiError {
        let message = resolve_error_message(&error);
        warn!(
            status = error.response.as_ref().map(|r| r.status),
            transport_message = %error.message,
            "Request failed: {}",
            message
        );
        ApiError::new(message)
    }
}

/// Picks, in order: the body's `error` field, the transport message, the fallback.
pub fn resolve_error_message(error: &TransportError) -> String {
    error
        .response
        .as_ref()
        .and_then(|response| response.data.get("error"))
        .and_then(truthy_text)
        .or_else(|| Some(error.message.clone()).filter(|m| !m.is_empty()))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Joins base and path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Preconfigured HTTP client with request/response interceptors
#[derive(Clone)]
pub struct HttpClient {
    defaults: ClientDefaults,
    transport: Arc<dyn Transport>,
    request_interceptor: Arc<dyn RequestInterceptor>,
    response_interceptor: Arc<dyn ResponseInterceptor>,
}

impl HttpClient {
    pub fn new(defaults: ClientDefaults, transport: Arc<dyn Transport>) -> Self {
        Self {
            defaults,
            transport,
            request_interceptor: Arc::new(PassThrough),
            response_interceptor: Arc::new(UnwrapData),
        }
    }

    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptor = interceptor;
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptor = interceptor;
        self
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    pub async fn request(&self, config: RequestConfig) -> Result<Value, ApiError> {
        let config = self.request_interceptor.on_request(config)?;
        let prepared = self.prepare(config);

        debug!(
            "{} {} (timeout {}ms)",
            prepared.method,
            prepared.url,
            prepared.timeout.as_millis()
        );

        match self.transport.send(prepared).await {
            Ok(response) => self.response_interceptor.on_success(response),
            Err(error) => Err(self.response_interceptor.on_error(error)),
        }
    }

    fn prepare(&self, config: RequestConfig) -> PreparedRequest {
        let mut headers = self.defaults.headers.clone();
        for (name, value) in config.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        PreparedRequest {
            method: config.method,
            url: join_url(&self.defaults.base_url, &config.path),
            headers,
            body: config.body,
            timeout: config.timeout.unwrap_or(self.defaults.timeout),
        }
    }
}
