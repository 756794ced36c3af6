//! # Core Module
//!
//! The UI-agnostic similarity engine.
//!
//! ## Modules
//! - `decoder` - Turns file paths and buffers into decoded images
//! - `histogram` - Per-channel histograms and their resemblance metric
//! - `scorer` - Scores two decoded images, 0-100
//! - `batch` - Scores one reference against many candidates in parallel
//! - `request` - JSON request/response contract for batch comparisons

pub mod batch;
pub mod decoder;
pub mod histogram;
pub mod request;
pub mod scorer;

// Re-export commonly used types
pub use batch::{BatchComparator, BatchReport, CandidateOutcome};
pub use decoder::{Decoder, FastDecoder, ImageSource};
pub use histogram::Histogram;
pub use request::{SimilarityRequest, SimilarityResponse};
pub use scorer::{ScoreBreakdown, SimilarityScore, SimilarityScorer};
