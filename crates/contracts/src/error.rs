//! Layered error definitions
//!
//! Categorized by source: config / source / calibration / encode
//!
//! Per-item conditions (an unreadable frame, an unmatched source) are not
//! errors; they surface through diagnostics and batch metadata instead.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum AlignError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Source folder does not exist
    #[error("source '{source_id}' not found at {path}")]
    SourceMissing { source_id: String, path: PathBuf },

    /// Source folder exists but cannot be read
    #[error("source '{source_id}' unreadable at {path}: {message}")]
    SourceUnreadable {
        source_id: String,
        path: PathBuf,
        message: String,
    },

    // ===== Calibration Errors =====
    /// A source's catalog has no captures left after filtering, so no
    /// calibration anchor exists. Distinct from a per-batch empty match.
    #[error("source '{source_id}' has no usable captures after filtering")]
    EmptyCatalog { source_id: String },

    // ===== Encode Errors =====
    /// Sequence encoder failure for a specific batch
    #[error("encode error for batch {batch_index}: {message}")]
    Encode { batch_index: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl AlignError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source-missing error
    pub fn source_missing(source_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::SourceMissing {
            source_id: source_id.into(),
            path: path.into(),
        }
    }

    /// Create source-unreadable error
    pub fn source_unreadable(
        source_id: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::SourceUnreadable {
            source_id: source_id.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create empty-catalog error
    pub fn empty_catalog(source_id: impl Into<String>) -> Self {
        Self::EmptyCatalog {
            source_id: source_id.into(),
        }
    }

    /// Create encode error
    pub fn encode(batch_index: usize, message: impl Into<String>) -> Self {
        Self::Encode {
            batch_index,
            message: message.into(),
        }
    }
}
