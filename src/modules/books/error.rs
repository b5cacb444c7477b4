use bookshelf_http::AppError;
use serde_json::json;
use thiserror::Error;

/// Failures of catalog operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("a book titled '{title}' by '{author}' already exists")]
    Conflict { title: String, author: String },

    #[error("book {id} not found")]
    NotFound { id: u64 },

    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::Conflict { title, author } => {
                AppError::conflict(vec![json!({ "title": title, "author": author })], message)
            }
            CatalogError::NotFound { .. } => AppError::not_found(message),
            CatalogError::Validation { field, reason } => {
                AppError::validation(vec![json!({ "field": field, "error": reason })], message)
            }
        }
    }
}
