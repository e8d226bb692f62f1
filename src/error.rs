//! Error types and query validation for the medicine search service

use serde::Serialize;
use std::fmt;

/// Maximum query length in characters, after trimming
pub const MAX_QUERY_LEN: usize = 100;

/// Application error types
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidQuery(String),
    StoreUnavailable(String),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "Record store unavailable: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Get the error code for wire responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidQuery(_) => "invalid_query",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert serde_json::Error to AppError
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert std::io::Error to AppError
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Validate and normalize query text.
///
/// Trims and NFKC-normalizes, then requires 1..=100 characters. Runs before
/// any store access; the returned string is what the engine matches against.
pub fn validate_query(query: &str) -> Result<String, AppError> {
    let normalized = normalize_text(query);

    if normalized.is_empty() {
        return Err(AppError::InvalidQuery("Query cannot be empty".to_string()));
    }

    if normalized.chars().count() > MAX_QUERY_LEN {
        return Err(AppError::InvalidQuery(format!(
            "Query too long, maximum {} characters",
            MAX_QUERY_LEN
        )));
    }

    Ok(normalized)
}

/// Normalize text using Unicode NFKC
pub fn normalize_text(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    text.nfkc().collect::<String>().trim().to_string()
}
