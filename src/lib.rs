//! # Wardrobe Similarity
//!
//! Scores how closely garment photos resemble each other.
//!
//! ## How Scoring Works
//! - Every image is resampled to 256x256 and split into red, green and blue
//! - Each channel becomes a 256-bucket intensity histogram
//! - Histograms are compared bucket by bucket and averaged into a 0-100 score
//!
//! ## Architecture
//! - `core` - The scoring engine (decoder, histograms, scorer, batches)
//! - `events` - Progress events for batch comparisons
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, WardrobeError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. The filter is
/// read from `RUST_LOG`.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber installed by an embedding application wins
    let _ = tracing::subscriber::set_global_default(subscriber);
}
