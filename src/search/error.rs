//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while indexing or searching person records
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Index could not be opened or created
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// The index rejected a document write
    #[error("Document indexing failed: {0}")]
    IndexingFailed(String),

    /// The index rejected a deletion
    #[error("Document deletion failed: {0}")]
    DeletionFailed(String),

    /// The index could not execute the constructed query
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// A transliteration adapter failed while romanizing a field
    #[error("Transliteration by {adapter} failed: {message}")]
    Transliteration { adapter: String, message: String },

    /// Record resolution failed for a reason other than not-found/expired
    #[error("Record store error: {0}")]
    RecordStore(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tantivy error
    #[error("Tantivy error: {0}")]
    TantivyError(String),
}

impl SearchError {
    pub fn transliteration(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        SearchError::Transliteration {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Write/delete rejected by the underlying index
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            SearchError::IndexInitFailed(_)
                | SearchError::IndexingFailed(_)
                | SearchError::DeletionFailed(_)
                | SearchError::TantivyError(_)
        )
    }

    pub fn is_query_error(&self) -> bool {
        matches!(self, SearchError::QueryFailed(_))
    }

    pub fn is_adapter_error(&self) -> bool {
        matches!(self, SearchError::Transliteration { .. })
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::TantivyError(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::IoError(err) => AppError::Io(err),
            SearchError::RecordStore(msg) => AppError::Storage(msg),
            other => AppError::Search(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(SearchError::IndexingFailed("x".into()).is_index_error());
        assert!(SearchError::DeletionFailed("x".into()).is_index_error());
        assert!(SearchError::QueryFailed("x".into()).is_query_error());
        assert!(!SearchError::QueryFailed("x".into()).is_index_error());

        let err = SearchError::transliteration("romanize_word_by_unidecode", "boom");
        assert!(err.is_adapter_error());
        assert_eq!(
            err.to_string(),
            "Transliteration by romanize_word_by_unidecode failed: boom"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = SearchError::InvalidConfiguration("bad".into()).into();
        assert!(matches!(app, AppError::Configuration(_)));

        let app: AppError = SearchError::QueryFailed("bad".into()).into();
        assert!(matches!(app, AppError::Search(_)));
    }
}
