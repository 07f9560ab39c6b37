use serde::Serialize;

use crate::api::{FileInfo, TranslatedPage};
use crate::error::ApiError;

/// UI-facing state of one upload/translate cycle.
///
/// Plain fields with derived values computed on read. The store imposes no
/// ordering between operations; callers drive the flags and feed results in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationStore {
    current_file: Option<FileInfo>,
    total_pages: u32,
    translated_pages: Vec<TranslatedPage>,
    is_uploading: bool,
    is_translating: bool,
    upload_progress: u8,
    translate_progress: usize,
    error: Option<ApiError>,
}

/// Serializable view of the store, derived values included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub current_file: Option<FileInfo>,
    pub total_pages: u32,
    pub translated_pages: Vec<TranslatedPage>,
    pub is_uploading: bool,
    pub is_translating: bool,
    pub upload_progress: u8,
    pub translate_progress: usize,
    pub error: Option<String>,
    pub has_file: bool,
    pub has_results: bool,
    pub translate_progress_percent: u8,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current file. Clears previous results, their progress and
    /// the error; leaves flags alone.
    pub fn set_file(&mut self, file_info: FileInfo) {
        self.total_pages = file_info.total_pages.unwrap_or(0);
        self.current_file = Some(file_info);
        self.translated_pages = Vec::new();
        self.translate_progress = 0;
        self.error = None;
    }

    /// Replace translated pages wholesale; progress follows the new length.
    pub fn set_translated_pages(&mut self, pages: Vec<TranslatedPage>) {
        self.translate_progress = pages.len();
        self.translated_pages = pages;
    }

    pub fn set_uploading(&mut self, value: bool) {
        self.is_uploading = value;
    }

    pub fn set_translating(&mut self, value: bool) {
        self.is_translating = value;
    }

    pub fn set_upload_progress(&mut self, value: u8) {
        self.upload_progress = value;
    }

    pub fn set_error(&mut self, error: Option<ApiError>) {
        self.error = error;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current_file(&self) -> Option<&FileInfo> {
        self.current_file.as_ref()
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn translated_pages(&self) -> &[TranslatedPage] {
        &self.translated_pages
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn is_translating(&self) -> bool {
        self.is_translating
    }

    pub fn upload_progress(&self) -> u8 {
        self.upload_progress
    }

    pub fn translate_progress(&self) -> usize {
        self.translate_progress
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.current_file.is_some()
    }

    pub fn has_results(&self) -> bool {
        !self.translated_pages.is_empty()
    }

    /// Rounded share of pages translated, capped at 100
    pub fn translate_progress_percent(&self) -> u8 {
        if self.total_pages == 0 {
            return 0;
        }
        let percent = (self.translate_progress as f64 / self.total_pages as f64 * 100.0).round();
        percent.min(100.0) as u8
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            current_file: self.current_file.clone(),
            total_pages: self.total_pages,
            translated_pages: self.translated_pages.clone(),
            is_uploading: self.is_uploading,
            is_translating: self.is_translating,
            upload_progress: self.upload_progress,
            translate_progress: self.translate_progress,
            error: self.error.as_ref().map(|e| e.message().to_string()),
            has_file: self.has_file(),
            has_results: self.has_results(),
            translate_progress_percent: self.translate_progress_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with_pages(total_pages: Option<u32>) -> FileInfo {
        FileInfo {
            total_pages,
            filepath: Some("uploads/a.pdf".to_string()),
            ..FileInfo::default()
        }
    }

    fn pages(n: u32) -> Vec<TranslatedPage> {
        (1..=n)
            .map(|page| TranslatedPage {
                page: Some(page),
                translated: Some(format!("page {}", page)),
                ..TranslatedPage::default()
            })
            .collect()
    }

    #[test]
    fn new_store_is_empty() {
        let store = TranslationStore::new();
        assert!(!store.has_file());
        assert!(!store.has_results());
        assert_eq!(store.total_pages(), 0);
        assert_eq!(store.translate_progress(), 0);
        assert_eq!(store.translate_progress_percent(), 0);
        assert!(store.error().is_none());
        assert!(!store.is_uploading());
        assert!(!store.is_translating());
    }

    #[test]
    fn set_file_takes_total_pages() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(12)));
        assert_eq!(store.total_pages(), 12);
        assert!(store.has_file());
    }

    #[test]
    fn set_file_without_total_pages_means_zero() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(5)));
        store.set_file(file_with_pages(None));
        assert_eq!(store.total_pages(), 0);
        assert!(store.has_file());
    }

    #[test]
    fn set_file_clears_results_and_error_but_not_flags() {
        let mut store = TranslationStore::new();
        store.set_translated_pages(pages(2));
        store.set_error(Some(ApiError::new("boom")));
        store.set_uploading(true);
        store.set_translating(true);

        store.set_file(file_with_pages(Some(3)));

        assert!(store.translated_pages().is_empty());
        assert!(store.error().is_none());
        assert!(store.is_uploading());
        assert!(store.is_translating());
    }

    #[test]
    fn switching_files_drops_previous_progress() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(2)));
        store.set_translated_pages(pages(2));
        assert_eq!(store.translate_progress_percent(), 100);

        store.set_file(file_with_pages(Some(4)));

        assert!(!store.has_results());
        assert_eq!(store.translate_progress(), 0);
        assert_eq!(store.translate_progress(), store.translated_pages().len());
        assert_eq!(store.translate_progress_percent(), 0);
    }

    #[test]
    fn set_translated_pages_tracks_length() {
        let mut store = TranslationStore::new();
        for n in [0, 1, 4, 9] {
            let replacement = pages(n);
            store.set_translated_pages(replacement.clone());
            assert_eq!(store.translate_progress(), n as usize);
            assert_eq!(store.translated_pages(), replacement.as_slice());
            assert_eq!(store.has_results(), n > 0);
        }
    }

    #[test]
    fn percent_is_zero_without_total_pages() {
        let mut store = TranslationStore::new();
        store.set_translated_pages(pages(3));
        assert_eq!(store.translate_progress_percent(), 0);
    }

    #[test]
    fn percent_is_rounded() {
        let cases = [(3, 1, 33), (4, 1, 25), (4, 3, 75), (3, 2, 67), (8, 8, 100)];
        for (total, done, expected) in cases {
            let mut store = TranslationStore::new();
            store.set_file(file_with_pages(Some(total)));
            store.set_translated_pages(pages(done));
            assert_eq!(
                store.translate_progress_percent(),
                expected,
                "{} of {}",
                done,
                total
            );
        }
    }

    #[test]
    fn percent_is_capped_when_progress_overshoots() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(2)));
        store.set_translated_pages(pages(5));
        assert_eq!(store.translate_progress_percent(), 100);
    }

    #[test]
    fn error_is_last_write_wins() {
        let mut store = TranslationStore::new();
        store.set_error(Some(ApiError::new("first")));
        store.set_error(Some(ApiError::new("second")));
        assert_eq!(store.error().map(ApiError::message), Some("second"));
        store.set_error(None);
        assert!(store.error().is_none());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(4)));
        store.set_translated_pages(pages(2));
        store.set_uploading(true);
        store.set_translating(true);
        store.set_upload_progress(80);
        store.set_error(Some(ApiError::new("boom")));

        store.reset();
        assert_eq!(store, TranslationStore::default());
        assert!(!store.has_file());

        store.reset();
        assert_eq!(store, TranslationStore::default());
    }

    #[test]
    fn snapshot_includes_derived_values() {
        let mut store = TranslationStore::new();
        store.set_file(file_with_pages(Some(4)));
        store.set_translated_pages(pages(1));
        store.set_error(Some(ApiError::new("partial")));

        let snapshot = store.snapshot();
        assert!(snapshot.has_file);
        assert!(snapshot.has_results);
        assert_eq!(snapshot.translate_progress_percent, 25);
        assert_eq!(snapshot.error.as_deref(), Some("partial"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["translate_progress"], 1);
        assert_eq!(json["current_file"]["total_pages"], 4);
    }
}
