//! Core domain logic for the learning reflections journal.
//! This crate owns the persisted reflection collection and its invariants.

pub mod export;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use export::csv::{export_csv, ExportBlob, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::reflection::{Reflection, ReflectionForm, DATE_FORMAT};
pub use search::filter::{filter_view, search, SearchError, SearchQuery, SearchResult, ViewRow};
pub use service::reflection_service::{ListView, ReflectionService, ServiceError, ServiceResult};
pub use store::{
    resolve_store_path, JsonFileReflectionStore, ReflectionStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
