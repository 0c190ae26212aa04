//! Error types for the ddtx-core library.

use thiserror::Error;

/// Main error type for the ddtx library.
#[derive(Error, Debug)]
pub enum DdtxError {
    /// Document field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Address strategy error.
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document contains no text tokens.
    #[error("document contains no text")]
    NoText,

    /// The document does not follow the two-column template.
    #[error("unsupported template: {reason}")]
    UnsupportedTemplate { reason: String },

    /// No strategy could determine the delivery address.
    #[error("delivery address not determined")]
    AddressNotDetermined,

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Errors raised by a single address strategy.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// The strategy returned an error.
    #[error("{strategy} failed: {reason}")]
    Failed { strategy: String, reason: String },

    /// The strategy panicked.
    #[error("{strategy} panicked: {message}")]
    Panicked { strategy: String, message: String },
}

/// Result type for the ddtx library.
pub type Result<T> = std::result::Result<T, DdtxError>;
