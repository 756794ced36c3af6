//! # Histogram Module
//!
//! Per-channel intensity histograms and the bucket-wise resemblance metric.
//!
//! ## How It Works
//! 1. Count pixels at each of the 256 intensity levels of one channel
//! 2. Compare two histograms bucket by bucket
//! 3. Equal buckets (including two empty ones) count as full agreement
//! 4. Unequal buckets contribute `1 - |a - b| / max(a, b)`
//! 5. The channel's resemblance is the mean over all 256 buckets

/// Number of buckets, one per 8-bit intensity level
pub const BUCKET_COUNT: usize = 256;

/// Pixel counts for each intensity level of a single channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u32; BUCKET_COUNT],
}

impl Histogram {
    /// Build a histogram from a single channel plane.
    pub fn from_plane(plane: &[u8]) -> Self {
        let mut counts = [0u32; BUCKET_COUNT];
        for &value in plane {
            counts[value as usize] += 1;
        }
        Self { counts }
    }

    /// Count for a single intensity level
    pub fn count(&self, level: u8) -> u32 {
        self.counts[level as usize]
    }

    /// All bucket counts in intensity-ascending order
    pub fn counts(&self) -> &[u32; BUCKET_COUNT] {
        &self.counts
    }

    /// Total number of pixels counted
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Fraction of agreement with another histogram, in `[0, 1]`.
    ///
    /// Symmetric in its operands. Two empty buckets agree fully.
    pub fn resemblance(&self, other: &Histogram) -> f64 {
        let degree: f64 = self
            .counts
            .iter()
            .zip(other.counts.iter())
            .map(|(&a, &b)| bucket_agreement(a, b))
            .sum();

        degree / BUCKET_COUNT as f64
    }
}

/// Agreement between two bucket counts.
///
/// Equality is checked before dividing, so `0 == 0` never divides by zero.
fn bucket_agreement(a: u32, b: u32) -> f64 {
    if a == b {
        return 1.0;
    }
    let diff = a.abs_diff(b) as f64;
    let max = a.max(b) as f64;
    1.0 - diff / max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_pixel_count() {
        let plane: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
        let hist = Histogram::from_plane(&plane);

        assert_eq!(hist.counts().len(), BUCKET_COUNT);
        assert_eq!(hist.total(), 1000);
    }

    #[test]
    fn bucket_index_is_intensity() {
        let hist = Histogram::from_plane(&[0, 0, 7, 255, 255, 255]);

        assert_eq!(hist.count(0), 2);
        assert_eq!(hist.count(7), 1);
        assert_eq!(hist.count(255), 3);
        assert_eq!(hist.count(128), 0);
    }

    #[test]
    fn identical_histograms_fully_resemble() {
        let hist = Histogram::from_plane(&[10, 20, 30, 30]);
        assert_eq!(hist.resemblance(&hist), 1.0);
    }

    #[test]
    fn empty_buckets_count_as_agreement() {
        let a = Histogram::from_plane(&[0; 16]);
        let b = Histogram::from_plane(&[255; 16]);

        // Buckets 0 and 255 disagree completely, the other 254 are 0 == 0
        assert_eq!(a.resemblance(&b), 254.0 / 256.0);
    }

    #[test]
    fn partial_bucket_uses_relative_difference() {
        assert_eq!(bucket_agreement(3, 4), 0.75);
        assert_eq!(bucket_agreement(4, 3), 0.75);
        assert_eq!(bucket_agreement(0, 9), 0.0);
        assert_eq!(bucket_agreement(0, 0), 1.0);
    }

    #[test]
    fn resemblance_is_symmetric() {
        let a = Histogram::from_plane(&[1, 1, 2, 3, 5, 8, 13]);
        let b = Histogram::from_plane(&[1, 2, 2, 2, 5, 9, 13, 13]);

        assert_eq!(a.resemblance(&b), b.resemblance(&a));
    }
}
