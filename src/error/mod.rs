//! # Error Module
//!
//! Error types for the similarity engine.
//!
//! ## Design Principles
//! - **Never panic** on user images - return errors instead
//! - **Include context** - which image, what size, what went wrong
//! - **No silent scores** - a comparison yields a score or an error, never a guess

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

/// Errors that occur while decoding or scoring images
#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Failed to decode image {source_name}: {reason}")]
    Decode {
        source_name: String,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Image {source_name} is empty ({width}x{height})")]
    EmptyImage {
        source_name: String,
        width: u32,
        height: u32,
    },

    /// The resampler rejected buffers built from a non-empty image.
    /// Unreachable unless an internal invariant is broken.
    #[error("Resize failed: {0}")]
    Resize(String),
}

impl SimilarityError {
    /// Build a decode error for the given source
    pub fn decode(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Build a decode error for a file that could not be read
    pub fn unreadable(path: &Path, source: std::io::Error) -> Self {
        Self::Decode {
            source_name: path.display().to_string(),
            reason: format!("unreadable: {}", source),
            source: Some(source),
        }
    }
}

/// Errors in a batch similarity request
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Reference image identifier is empty")]
    EmptyReference,

    #[error("No candidate images to compare against")]
    NoCandidates,

    #[error("Unsupported image extension: {identifier} (allowed: png, jpg, jpeg, webp)")]
    UnsupportedExtension { identifier: String },

    #[error("Malformed request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read request file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, WardrobeError>;
