//! Event type definitions for progress reporting.

use crate::core::scorer::SimilarityScore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All events emitted while comparing images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Reference image events
    Reference(ReferenceEvent),
    /// Per-candidate batch events
    Batch(BatchEvent),
}

/// Events about the reference image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReferenceEvent {
    /// Reference decoded and its histograms built
    Prepared {
        name: String,
        width: u32,
        height: u32,
    },
    /// Reference could not be used; the batch stops
    Failed { name: String, message: String },
}

/// Events during the batch phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Candidate scoring has started
    Started { total_candidates: usize },
    /// Progress update after each candidate
    Progress(BatchProgress),
    /// A candidate was scored
    CandidateScored {
        name: String,
        score: SimilarityScore,
    },
    /// A candidate failed; the rest of the batch continues
    CandidateFailed { name: String, message: String },
    /// Every candidate has been processed
    Completed { summary: BatchSummary },
}

/// Progress information during a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Candidates finished so far, scored or failed
    pub completed: usize,
    /// Total number of candidates
    pub total: usize,
    /// Candidate that just finished
    pub current_name: String,
}

/// Summary of a finished batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Batch identifier, matches the report id
    pub batch_id: Uuid,
    /// Candidates that received a score
    pub scored: usize,
    /// Candidates that failed
    pub failed: usize,
    /// Highest score in the batch, if any candidate was scored
    pub best_score: Option<SimilarityScore>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
