use tracing::{info, warn};

use crate::api::{ApiClient, PdfFile};
use crate::error::ApiError;
use crate::store::TranslationStore;

pub const NO_FILE_MESSAGE: &str = "No file uploaded";

/// Drives the API client and feeds every outcome into a `TranslationStore`.
///
/// Created once per document view; call `reset` between documents.
pub struct TranslationSession {
    api: ApiClient,
    store: TranslationStore,
}

impl TranslationSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            store: TranslationStore::new(),
        }
    }

    pub fn store(&self) -> &TranslationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TranslationStore {
        &mut self.store
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    /// Upload a PDF and make it the current file
    pub async fn upload(&mut self, file: &PdfFile) -> Result<(), ApiError> {
        self.store.set_uploading(true);
        self.store.set_upload_progress(0);

        let result = self.api.upload_pdf(file).await;
        self.store.set_uploading(false);

        match result {
            Ok(file_info) => {
                info!(
                    "Uploaded {} ({} pages)",
                    file.file_name,
                    file_info.total_pages.unwrap_or(0)
                );
                self.store.set_upload_progress(100);
                self.store.set_file(file_info);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Translate the current file; `None` translates every page
    pub async fn translate(&mut self, page_numbers: Option<&[u32]>) -> Result<(), ApiError> {
        let current = self.store.current_file().and_then(|f| f.filepath.clone());
        let filepath = match current {
            Some(filepath) => filepath,
            None => return self.fail(ApiError::new(NO_FILE_MESSAGE)),
        };

        self.store.set_error(None);
        self.store.set_translating(true);

        let result = self.api.translate_pdf(&filepath, page_numbers).await;
        self.store.set_translating(false);

        match result {
            Ok(response) => {
                info!("Translated {} pages", response.translated_pages.len());
                self.store.set_translated_pages(response.translated_pages);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: ApiError) -> Result<(), ApiError> {
        warn!("Session operation failed: {}", err);
        self.store.set_error(Some(err.clone()));
        Err(err)
    }
}
