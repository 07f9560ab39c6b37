pub mod http;
pub mod transport;
pub mod types;

pub use self::http::{ClientDefaults, HttpClient, RequestConfig, RequestInterceptor, ResponseInterceptor};
pub use self::transport::{ReqwestTransport, RequestBody, Transport};
pub use self::types::{FileInfo, PdfFile, TranslateRequest, TranslateResponse, TranslatedPage};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ConfigError};
use self::http::{CONTENT_TYPE, MULTIPART_CONTENT_TYPE};
use self::transport::MultipartFile;

pub const UPLOAD_PATH: &str = "/upload";
pub const TRANSLATE_PATH: &str = "/translate";
pub const UPLOAD_FIELD: &str = "file";
pub const PDF_MIME: &str = "application/pdf";

/// Upload and translate calls against the translation server
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(http: HttpClient, upload_timeout: Duration) -> Self {
        Self {
            http,
            upload_timeout,
        }
    }

    /// Build a client talking to the configured server over `reqwest`
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let base_url = config.resolved_base_url()?;
        let transport = ReqwestTransport::new(config.timeout())?;
        info!("API client targeting {}", base_url);

        let http = HttpClient::new(
            ClientDefaults::new(base_url, config.timeout()),
            Arc::new(transport),
        );
        Ok(Self::new(http, config.upload_timeout()))
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub async fn upload_pdf(&self, file: &PdfFile) -> Result<FileInfo, ApiError> {
        let body = RequestBody::Multipart(MultipartFile {
            field: UPLOAD_FIELD.to_string(),
            file_name: file.file_name.clone(),
            mime: PDF_MIME.to_string(),
            bytes: file.bytes.clone(),
        });
        let request = RequestConfig::post(UPLOAD_PATH, body)
            .header(CONTENT_TYPE, MULTIPART_CONTENT_TYPE)
            .timeout(self.upload_timeout);

        info!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());
        decode(self.http.request(request).await?)
    }

    pub async fn translate_pdf(
        &self,
        filepath: &str,
        page_numbers: Option<&[u32]>,
    ) -> Result<TranslateResponse, ApiError> {
        let payload = TranslateRequest {
            filepath,
            page_numbers,
        };
        let body = serde_json::to_value(&payload).map_err(|e| ApiError::new(e.to_string()))?;

        info!(
            "Requesting translation of {} (pages: {:?})",
            filepath, page_numbers
        );
        decode(
            self.http
                .request(RequestConfig::post(TRANSLATE_PATH, RequestBody::Json(body)))
                .await?,
        )
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::new(format!("Unexpected response body: {}", e)))
}
