//! Score, breakdown and resampling types.

use fast_image_resize::{FilterType, ResizeAlg};
use serde::{Deserialize, Serialize};

/// Display names of the compared planes, in channel order
pub const CHANNEL_NAMES: [&str; 3] = ["red", "green", "blue"];

/// Degree of resemblance between two images, 0-100.
///
/// 100 means the images are identical under the histogram metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SimilarityScore(u8);

impl SimilarityScore {
    /// Highest possible score
    pub const MAX: SimilarityScore = SimilarityScore(100);

    /// Convert a combined resemblance in `[0, 1]` to a percentage.
    ///
    /// Truncates: 0.999 becomes 99, never 100.
    pub fn from_resemblance(resemblance: f64) -> Self {
        let percent = (resemblance.clamp(0.0, 1.0) * 100.0) as u8;
        Self(percent)
    }

    /// The score as an integer percentage
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SimilarityScore {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX.0 {
            return Err(format!("similarity score {} exceeds 100", value));
        }
        Ok(Self(value))
    }
}

impl From<SimilarityScore> for u8 {
    fn from(score: SimilarityScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-channel view of a comparison, for explaining a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Resemblance of each channel, in `[0, 1]`
    pub channels: [f64; 3],
    /// Mean of the channel resemblances
    pub resemblance: f64,
    /// Final truncated percentage
    pub score: SimilarityScore,
}

impl ScoreBreakdown {
    /// Build a breakdown from per-channel resemblance values
    pub fn from_channels(channels: [f64; 3]) -> Self {
        let resemblance = (channels[0] + channels[1] + channels[2]) / 3.0;
        Self {
            channels,
            resemblance,
            score: SimilarityScore::from_resemblance(resemblance),
        }
    }

    /// Name of the channel that agrees least
    pub fn weakest_channel(&self) -> &'static str {
        let mut weakest = 0;
        for (i, value) in self.channels.iter().enumerate() {
            if *value < self.channels[weakest] {
                weakest = i;
            }
        }
        CHANNEL_NAMES[weakest]
    }
}

/// Resampling filter used for the canonical resize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour - fastest, no blending
    Nearest,
    /// Bilinear convolution - good balance (default)
    #[default]
    Bilinear,
    /// Lanczos3 convolution - sharpest, slowest
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_resize_alg(self) -> ResizeAlg {
        match self {
            ResizeFilter::Nearest => ResizeAlg::Nearest,
            ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

impl std::fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeFilter::Nearest => write!(f, "nearest"),
            ResizeFilter::Bilinear => write!(f, "bilinear"),
            ResizeFilter::Lanczos3 => write!(f, "lanczos3"),
        }
    }
}
