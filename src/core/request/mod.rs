//! # Request Module
//!
//! The caller-facing JSON contract for batch comparisons.
//!
//! ```json
//! { "image": "shirt.jpg", "images": { "1": "a.png", "2": "b.webp" } }
//! ```
//!
//! is answered with
//!
//! ```json
//! { "similarity": { "1": 87, "2": 99 } }
//! ```
//!
//! Candidates that could not be scored are listed under `failed`, which is
//! left out when empty.

use crate::core::batch::BatchReport;
use crate::core::decoder::{has_allowed_extension, ImageSource};
use crate::core::scorer::SimilarityScore;
use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A reference image and the named candidates to score against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityRequest {
    /// Reference image identifier
    pub image: String,
    /// Candidate name to image identifier
    pub images: BTreeMap<String, String>,
}

impl SimilarityRequest {
    /// Parse a request from JSON text
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a request file
    pub fn from_file(path: &Path) -> Result<Self, RequestError> {
        let json = std::fs::read_to_string(path).map_err(|source| RequestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Reject requests that cannot produce a meaningful batch.
    ///
    /// Only the reference's extension is checked; candidates that fail to
    /// decode are reported per candidate instead.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.image.trim().is_empty() {
            return Err(RequestError::EmptyReference);
        }

        if self.images.is_empty() {
            return Err(RequestError::NoCandidates);
        }

        if !has_allowed_extension(&self.image) {
            return Err(RequestError::UnsupportedExtension {
                identifier: self.image.clone(),
            });
        }

        Ok(())
    }

    /// Validate and resolve identifiers to file sources.
    ///
    /// Relative identifiers are joined onto `base_dir` when one is given.
    pub fn into_sources(
        self,
        base_dir: Option<&Path>,
    ) -> Result<(ImageSource, BTreeMap<String, ImageSource>), RequestError> {
        self.validate()?;

        let resolve = |identifier: String| -> ImageSource {
            let path = PathBuf::from(identifier);
            match base_dir {
                Some(base) if path.is_relative() => ImageSource::Path(base.join(path)),
                _ => ImageSource::Path(path),
            }
        };

        let reference = resolve(self.image);
        let candidates = self
            .images
            .into_iter()
            .map(|(name, identifier)| (name, resolve(identifier)))
            .collect();

        Ok((reference, candidates))
    }
}

/// Scores keyed by candidate name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityResponse {
    /// Candidate name to score
    pub similarity: BTreeMap<String, SimilarityScore>,
    /// Candidate name to failure reason
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failed: BTreeMap<String, String>,
}

impl From<&BatchReport> for SimilarityResponse {
    fn from(report: &BatchReport) -> Self {
        Self {
            similarity: report.scores(),
            failed: report.failures(),
        }
    }
}
