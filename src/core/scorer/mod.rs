//! # Scorer Module
//!
//! Scores how much two decoded images resemble each other, 0-100.
//!
//! ## How It Works
//! 1. Resize both images to 256x256 so size and framing don't bias the counts
//! 2. Split each into red, green and blue planes
//! 3. Build a 256-bucket histogram per plane
//! 4. Compare histograms bucket by bucket (see [`Histogram::resemblance`])
//! 5. Average the three channels, multiply by 100 and truncate
//!
//! Histograms ignore where pixels are, so a garment shot with different
//! framing still scores high. Two solid images at opposite ends of the
//! intensity range still score 99: only two of 256 buckets disagree.
//!
//! ## Example
//! ```rust,ignore
//! use wardrobe_similarity::core::scorer::SimilarityScorer;
//!
//! let scorer = SimilarityScorer::new();
//! let score = scorer.score(&shirt, &candidate)?;
//! ```

pub mod resize;
mod types;

pub use resize::{split_channels, CanonicalResizer, CANONICAL_SIZE, CHANNEL_COUNT};
pub use types::{ResizeFilter, ScoreBreakdown, SimilarityScore, CHANNEL_NAMES};

use crate::core::histogram::Histogram;
use crate::error::SimilarityError;
use image::DynamicImage;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration builder for the scorer
#[derive(Debug, Clone, Default)]
pub struct ScorerConfig {
    /// Filter used for the canonical resize
    filter: ResizeFilter,
}

impl ScorerConfig {
    /// Create a scorer configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resampling filter.
    ///
    /// The filter only affects how edges blend after resizing; solid regions
    /// keep their exact colour with any filter.
    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Build the scorer
    pub fn build(self) -> SimilarityScorer {
        SimilarityScorer { config: self }
    }
}

/// Channel histograms of an image already brought to canonical size.
///
/// Preparing once lets a reference be compared against many candidates.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    histograms: [Histogram; CHANNEL_COUNT],
}

impl PreparedImage {
    /// Histogram of one channel, in [`CHANNEL_NAMES`] order
    pub fn histogram(&self, channel: usize) -> Option<&Histogram> {
        self.histograms.get(channel)
    }

    /// Compare against another prepared image
    pub fn compare(&self, other: &PreparedImage) -> ScoreBreakdown {
        let mut channels = [0.0; CHANNEL_COUNT];
        for (i, value) in channels.iter_mut().enumerate() {
            *value = self.histograms[i].resemblance(&other.histograms[i]);
        }
        ScoreBreakdown::from_channels(channels)
    }
}

/// Histogram-based image similarity scorer.
///
/// Pure and deterministic: it holds no mutable state and does no I/O.
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    config: ScorerConfig,
}

impl SimilarityScorer {
    /// Create a scorer with the default bilinear filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer configuration builder
    pub fn builder() -> ScorerConfig {
        ScorerConfig::new()
    }

    /// The filter used for resizing
    pub fn filter(&self) -> ResizeFilter {
        self.config.filter
    }

    /// Resize, split and histogram an image
    pub fn prepare(
        &self,
        image: &DynamicImage,
        source_name: &str,
    ) -> Result<PreparedImage, SimilarityError> {
        let mut resizer = CanonicalResizer::new(self.config.filter);
        let canonical = resizer.resize_to_canonical(image, source_name)?;
        let planes = split_channels(&canonical);

        let histograms = [
            Histogram::from_plane(&planes[0]),
            Histogram::from_plane(&planes[1]),
            Histogram::from_plane(&planes[2]),
        ];

        debug!(
            source = source_name,
            width = image.width(),
            height = image.height(),
            "Prepared image histograms"
        );

        Ok(PreparedImage { histograms })
    }

    /// Score the similarity of two images
    pub fn score(
        &self,
        image_a: &DynamicImage,
        image_b: &DynamicImage,
    ) -> Result<SimilarityScore, SimilarityError> {
        Ok(self.score_detailed(image_a, image_b)?.score)
    }

    /// Score two images and keep the per-channel resemblance values
    pub fn score_detailed(
        &self,
        image_a: &DynamicImage,
        image_b: &DynamicImage,
    ) -> Result<ScoreBreakdown, SimilarityError> {
        let prepared_a = self.prepare(image_a, "image A")?;
        let prepared_b = self.prepare(image_b, "image B")?;
        Ok(prepared_a.compare(&prepared_b))
    }

    /// Score one reference against several named candidates.
    ///
    /// Candidates are scored independently and in parallel. A candidate
    /// that cannot be scored gets its own error; the others are unaffected.
    /// Fails as a whole only if the reference itself cannot be prepared.
    pub fn score_batch(
        &self,
        reference: &DynamicImage,
        candidates: &BTreeMap<String, DynamicImage>,
    ) -> Result<BTreeMap<String, Result<SimilarityScore, SimilarityError>>, SimilarityError> {
        let prepared_reference = self.prepare(reference, "reference")?;

        let scores = candidates
            .par_iter()
            .map(|(name, candidate)| {
                let outcome = self
                    .prepare(candidate, name)
                    .map(|prepared| prepared_reference.compare(&prepared).score);
                (name.clone(), outcome)
            })
            .collect();

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, Rgba, RgbaImage};

    fn create_solid_image(width: u32, height: u32, r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([r, g, b])))
    }

    fn create_pattern(width: u32, height: u32, seed: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17)).wrapping_add(seed);
            Rgb([(v % 256) as u8, ((v / 3) % 256) as u8, ((x * y + seed) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_score_100() {
        let scorer = SimilarityScorer::new();
        let image = create_pattern(300, 200, 7);

        assert_eq!(scorer.score(&image, &image).unwrap(), SimilarityScore::MAX);
    }

    #[test]
    fn same_solid_colour_scores_100() {
        let scorer = SimilarityScorer::new();
        let a = create_solid_image(256, 256, 10, 10, 10);
        let b = create_solid_image(256, 256, 10, 10, 10);

        assert_eq!(scorer.score(&a, &b).unwrap().value(), 100);
    }

    #[test]
    fn same_solid_colour_at_different_sizes_scores_100() {
        let scorer = SimilarityScorer::new();
        let a = create_solid_image(40, 900, 10, 10, 10);
        let b = create_solid_image(1024, 3, 10, 10, 10);

        assert_eq!(scorer.score(&a, &b).unwrap().value(), 100);
    }

    #[test]
    fn black_versus_white_scores_99_not_0() {
        // All mass sits in bucket 0 for one image and bucket 255 for the
        // other. Those two buckets contribute 0 and the other 254 empty
        // buckets agree, so each channel is 254/256 and the score truncates
        // to 99.
        let scorer = SimilarityScorer::new();
        let black = create_solid_image(256, 256, 0, 0, 0);
        let white = create_solid_image(256, 256, 255, 255, 255);

        let breakdown = scorer.score_detailed(&black, &white).unwrap();

        assert_eq!(breakdown.channels, [254.0 / 256.0; 3]);
        assert_eq!(breakdown.score.value(), 99);
    }

    #[test]
    fn score_is_symmetric() {
        let scorer = SimilarityScorer::new();
        let a = create_pattern(120, 80, 1);
        let b = create_pattern(64, 200, 99);

        assert_eq!(scorer.score(&a, &b).unwrap(), scorer.score(&b, &a).unwrap());
    }

    #[test]
    fn score_is_deterministic() {
        let scorer = SimilarityScorer::new();
        let a = create_pattern(100, 100, 3);
        let b = create_pattern(100, 100, 4);

        let first = scorer.score_detailed(&a, &b).unwrap();
        let second = scorer.score_detailed(&a, &b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn score_stays_in_range_for_mixed_inputs() {
        let images = vec![
            create_pattern(17, 5, 0),
            create_pattern(500, 301, 42),
            create_solid_image(1, 1, 200, 0, 50),
            DynamicImage::ImageLuma8(GrayImage::from_fn(33, 33, |x, y| Luma([(x * y) as u8]))),
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(9, 70, Rgba([5, 6, 7, 128]))),
        ];

        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear, ResizeFilter::Lanczos3] {
            let scorer = SimilarityScorer::builder().filter(filter).build();
            for a in &images {
                for b in &images {
                    let score = scorer.score(a, b).unwrap().value();
                    assert!(score <= 100, "{} out of range with {}", score, filter);
                }
            }
        }
    }

    #[test]
    fn empty_image_is_rejected() {
        let scorer = SimilarityScorer::new();
        let valid = create_solid_image(10, 10, 1, 2, 3);
        let empty = DynamicImage::new_rgb8(10, 0);

        assert!(matches!(
            scorer.score(&valid, &empty),
            Err(SimilarityError::EmptyImage { .. })
        ));
        assert!(matches!(
            scorer.score(&empty, &valid),
            Err(SimilarityError::EmptyImage { .. })
        ));
    }

    #[test]
    fn prepared_histograms_cover_canonical_grid() {
        let scorer = SimilarityScorer::new();
        let prepared = scorer.prepare(&create_pattern(77, 13, 5), "pattern").unwrap();

        for channel in 0..CHANNEL_COUNT {
            assert_eq!(
                prepared.histogram(channel).map(Histogram::total),
                Some((CANONICAL_SIZE * CANONICAL_SIZE) as u64)
            );
        }
        assert!(prepared.histogram(CHANNEL_COUNT).is_none());
    }

    #[test]
    fn batch_matches_pairwise_scores() {
        let scorer = SimilarityScorer::new();
        let reference = create_pattern(128, 128, 11);

        let mut candidates = BTreeMap::new();
        candidates.insert("a".to_string(), create_pattern(128, 128, 11));
        candidates.insert("b".to_string(), create_solid_image(50, 50, 200, 10, 10));

        let scores = scorer.score_batch(&reference, &candidates).unwrap();

        assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        for (name, candidate) in &candidates {
            let expected = scorer.score(&reference, candidate).unwrap();
            assert_eq!(scores[name].as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn batch_isolates_failing_candidate() {
        let scorer = SimilarityScorer::new();
        let reference = create_solid_image(20, 20, 9, 9, 9);

        let mut candidates = BTreeMap::new();
        candidates.insert("empty".to_string(), DynamicImage::new_rgb8(0, 0));
        candidates.insert("same".to_string(), create_solid_image(20, 20, 9, 9, 9));

        let scores = scorer.score_batch(&reference, &candidates).unwrap();

        assert!(matches!(scores["empty"], Err(SimilarityError::EmptyImage { .. })));
        assert_eq!(scores["same"].as_ref().unwrap().value(), 100);
    }

    #[test]
    fn batch_fails_when_reference_is_empty() {
        let scorer = SimilarityScorer::new();
        let mut candidates = BTreeMap::new();
        candidates.insert("a".to_string(), create_solid_image(4, 4, 1, 1, 1));

        let result = scorer.score_batch(&DynamicImage::new_rgb8(0, 4), &candidates);
        assert!(result.is_err());
    }
}
