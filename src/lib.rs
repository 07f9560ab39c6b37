pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use crate::api::{ApiClient, FileInfo, PdfFile, TranslateResponse, TranslatedPage};
pub use crate::config::AppConfig;
pub use crate::error::{ApiError, ConfigError};
pub use crate::session::TranslationSession;
pub use crate::store::{StoreSnapshot, TranslationStore};
