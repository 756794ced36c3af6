//! # Batch Module
//!
//! Compares one reference image against a named set of candidates.
//!
//! ## Stages
//! 1. **Reference** - decode and histogram the reference once
//! 2. **Candidates** - decode and score every candidate in parallel
//! 3. **Report** - collect one outcome per candidate name
//!
//! ## Failure Policy
//! A reference that cannot be decoded fails the whole batch. A candidate
//! that cannot be decoded gets a `Failed` outcome; its siblings are still
//! scored.

use crate::core::decoder::{Decoder, FastDecoder, ImageSource};
use crate::core::scorer::{ResizeFilter, ScoreBreakdown, SimilarityScore, SimilarityScorer};
use crate::error::{SimilarityError, WardrobeError};
use crate::events::{
    null_sender, BatchEvent, BatchProgress, BatchSummary, Event, EventSender, ReferenceEvent,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of comparing the reference with one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// The candidate was scored
    Scored(ScoreBreakdown),
    /// The candidate could not be decoded or scored
    Failed { reason: String },
}

impl CandidateOutcome {
    /// The score, if the candidate was scored
    pub fn score(&self) -> Option<SimilarityScore> {
        match self {
            CandidateOutcome::Scored(breakdown) => Some(breakdown.score),
            CandidateOutcome::Failed { .. } => None,
        }
    }
}

/// Outcome of a batch comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique batch identifier
    pub id: Uuid,
    /// Name of the reference image
    pub reference: String,
    /// One outcome per candidate name
    pub outcomes: BTreeMap<String, CandidateOutcome>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl BatchReport {
    /// Scores of every successfully scored candidate
    pub fn scores(&self) -> BTreeMap<String, SimilarityScore> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| outcome.score().map(|s| (name.clone(), s)))
            .collect()
    }

    /// Failure reasons of every candidate that could not be scored
    pub fn failures(&self) -> BTreeMap<String, String> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| match outcome {
                CandidateOutcome::Failed { reason } => Some((name.clone(), reason.clone())),
                CandidateOutcome::Scored(_) => None,
            })
            .collect()
    }

    /// Highest-scoring candidate; ties go to the first name in order
    pub fn best_match(&self) -> Option<(&str, SimilarityScore)> {
        let mut best: Option<(&str, SimilarityScore)> = None;
        for (name, outcome) in &self.outcomes {
            if let Some(score) = outcome.score() {
                if best.map_or(true, |(_, current)| score > current) {
                    best = Some((name.as_str(), score));
                }
            }
        }
        best
    }
}

/// Configuration for batch comparisons
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Resampling filter for the canonical resize
    pub filter: ResizeFilter,
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

/// Builder for [`BatchComparator`]
pub struct BatchComparatorBuilder {
    config: BatchConfig,
    decoder: Option<Box<dyn Decoder>>,
}

impl BatchComparatorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
            decoder: None,
        }
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Run candidates on a dedicated pool of `threads` workers
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    /// Replace the default [`FastDecoder`]
    pub fn decoder(mut self, decoder: Box<dyn Decoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Build the comparator
    pub fn build(self) -> Result<BatchComparator, WardrobeError> {
        let pool = match self.config.threads {
            Some(0) => {
                return Err(WardrobeError::Config(
                    "thread count must be at least 1".to_string(),
                ))
            }
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| WardrobeError::Config(format!("failed to build thread pool: {}", e)))?,
            ),
            None => None,
        };

        Ok(BatchComparator {
            scorer: SimilarityScorer::builder().filter(self.config.filter).build(),
            decoder: self.decoder.unwrap_or_else(|| Box::new(FastDecoder::new())),
            pool,
        })
    }
}

impl Default for BatchComparatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores a reference image against many candidates
pub struct BatchComparator {
    scorer: SimilarityScorer,
    decoder: Box<dyn Decoder>,
    pool: Option<rayon::ThreadPool>,
}

impl BatchComparator {
    /// Create a new comparator builder
    pub fn builder() -> BatchComparatorBuilder {
        BatchComparatorBuilder::new()
    }

    /// Compare without events
    pub fn compare(
        &self,
        reference: &ImageSource,
        candidates: &BTreeMap<String, ImageSource>,
    ) -> Result<BatchReport, WardrobeError> {
        self.compare_with_events(reference, candidates, &null_sender())
    }

    /// Compare with event reporting
    pub fn compare_with_events(
        &self,
        reference: &ImageSource,
        candidates: &BTreeMap<String, ImageSource>,
        events: &EventSender,
    ) -> Result<BatchReport, WardrobeError> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4();
        let reference_name = reference.name();

        let prepared_reference = self
            .decoder
            .decode(reference)
            .and_then(|image| {
                let prepared = self.scorer.prepare(&image, &reference_name)?;
                events.send(Event::Reference(ReferenceEvent::Prepared {
                    name: reference_name.clone(),
                    width: image.width(),
                    height: image.height(),
                }));
                Ok(prepared)
            })
            .map_err(|e| {
                warn!(reference = %reference_name, error = %e, "Reference image unusable");
                events.send(Event::Reference(ReferenceEvent::Failed {
                    name: reference_name.clone(),
                    message: e.to_string(),
                }));
                e
            })?;

        let total = candidates.len();
        info!(%batch_id, reference = %reference_name, candidates = total, "Starting batch comparison");
        events.send(Event::Batch(BatchEvent::Started {
            total_candidates: total,
        }));

        let completed = AtomicUsize::new(0);

        let score_candidates = || -> BTreeMap<String, CandidateOutcome> {
            candidates
                .par_iter()
                .map(|(name, source)| {
                    let result: Result<ScoreBreakdown, SimilarityError> = self
                        .decoder
                        .decode(source)
                        .and_then(|image| self.scorer.prepare(&image, name))
                        .map(|prepared| prepared_reference.compare(&prepared));

                    let outcome = match result {
                        Ok(breakdown) => {
                            events.send(Event::Batch(BatchEvent::CandidateScored {
                                name: name.clone(),
                                score: breakdown.score,
                            }));
                            CandidateOutcome::Scored(breakdown)
                        }
                        Err(e) => {
                            warn!(candidate = %name, error = %e, "Candidate could not be scored");
                            events.send(Event::Batch(BatchEvent::CandidateFailed {
                                name: name.clone(),
                                message: e.to_string(),
                            }));
                            CandidateOutcome::Failed {
                                reason: e.to_string(),
                            }
                        }
                    };

                    let current_completed = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                        completed: current_completed,
                        total,
                        current_name: name.clone(),
                    })));

                    (name.clone(), outcome)
                })
                .collect()
        };

        let outcomes = match &self.pool {
            Some(pool) => pool.install(score_candidates),
            None => score_candidates(),
        };

        let report = BatchReport {
            id: batch_id,
            reference: reference_name,
            outcomes,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        let failed = report.failures().len();
        let summary = BatchSummary {
            batch_id,
            scored: total - failed,
            failed,
            best_score: report.best_match().map(|(_, score)| score),
            duration_ms: report.duration_ms,
        };

        info!(
            %batch_id,
            scored = summary.scored,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Batch comparison complete"
        );
        events.send(Event::Batch(BatchEvent::Completed { summary }));

        Ok(report)
    }
}
