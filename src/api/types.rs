use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Metadata returned by `/upload`. Only `total_pages` is relied upon; the
/// rest is whatever the server chose to send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Server-side location, passed back to `/translate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One translated page, shape owned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatedPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(default)]
    pub translated_pages: Vec<TranslatedPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a `/translate` call. `None` page numbers means every page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateRequest<'a> {
    pub filepath: &'a str,
    pub page_numbers: Option<&'a [u32]>,
}

/// A PDF held in memory, ready to be sent as a multipart part
#[derive(Debug, Clone, PartialEq)]
pub struct PdfFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(Self { file_name, bytes })
    }
}
