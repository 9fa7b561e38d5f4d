//! Error types for sequence encoding.

use std::path::PathBuf;

use thiserror::Error;

/// Encoder-side error types
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A batch frame could not be decoded
    #[error("frame decode failed for {file}: {message}")]
    FrameDecode { file: PathBuf, message: String },

    /// GIF stream encoding failure
    #[error("gif encoding failed: {message}")]
    Gif { message: String },

    /// Resume manifest could not be written
    #[error("manifest write failed at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    pub fn frame_decode(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FrameDecode {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn gif(message: impl Into<String>) -> Self {
        Self::Gif {
            message: message.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }
}
