//! Canonical resizing and channel splitting.
//!
//! Uses fast_image_resize, which is 5-14x faster than the image crate's resize.
//! Automatically uses AVX2/NEON SIMD when available.

use super::types::ResizeFilter;
use crate::error::SimilarityError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{DynamicImage, ImageBuffer, RgbImage};

/// Side length of the square every image is resampled to before comparison
pub const CANONICAL_SIZE: u32 = 256;

/// Number of colour planes compared
pub const CHANNEL_COUNT: usize = 3;

/// Resizes decoded images to the canonical 256x256 RGB grid
pub struct CanonicalResizer {
    resizer: Resizer,
    filter: ResizeFilter,
}

impl CanonicalResizer {
    /// Create a resizer using the given resampling filter
    pub fn new(filter: ResizeFilter) -> Self {
        Self {
            resizer: Resizer::new(),
            filter,
        }
    }

    /// Normalise an image to three 8-bit planes and resize it to 256x256.
    ///
    /// Grey images become three identical planes; alpha is dropped.
    pub fn resize_to_canonical(
        &mut self,
        image: &DynamicImage,
        source_name: &str,
    ) -> Result<RgbImage, SimilarityError> {
        let src_width = image.width();
        let src_height = image.height();

        if src_width == 0 || src_height == 0 {
            return Err(SimilarityError::EmptyImage {
                source_name: source_name.to_string(),
                width: src_width,
                height: src_height,
            });
        }

        let rgb = image.to_rgb8();

        let src_image = Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
            .map_err(|e| SimilarityError::Resize(format!("{}: invalid source buffer: {}", source_name, e)))?;

        let mut dst_image = Image::new(CANONICAL_SIZE, CANONICAL_SIZE, PixelType::U8x3);

        let options = ResizeOptions::new().resize_alg(self.filter.to_resize_alg());

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| SimilarityError::Resize(format!("{}: {}", source_name, e)))?;

        ImageBuffer::from_raw(CANONICAL_SIZE, CANONICAL_SIZE, dst_image.into_vec()).ok_or_else(|| {
            SimilarityError::Resize(format!("{}: result buffer has wrong length", source_name))
        })
    }
}

impl Default for CanonicalResizer {
    fn default() -> Self {
        Self::new(ResizeFilter::default())
    }
}

/// Split an RGB image into its three intensity planes
pub fn split_channels(image: &RgbImage) -> [Vec<u8>; CHANNEL_COUNT] {
    let pixel_count = (image.width() * image.height()) as usize;
    let mut planes: [Vec<u8>; CHANNEL_COUNT] = [
        Vec::with_capacity(pixel_count),
        Vec::with_capacity(pixel_count),
        Vec::with_capacity(pixel_count),
    ];

    for pixel in image.pixels() {
        for (plane, &value) in planes.iter_mut().zip(pixel.0.iter()) {
            plane.push(value);
        }
    }

    planes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};

    fn create_gradient(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) * 128 / (width + height).max(1)) as u8;
            Rgb([r, g, b])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_canonical_dimensions() {
        let mut resizer = CanonicalResizer::default();
        let resized = resizer
            .resize_to_canonical(&create_gradient(640, 480), "gradient")
            .unwrap();

        assert_eq!(resized.width(), CANONICAL_SIZE);
        assert_eq!(resized.height(), CANONICAL_SIZE);
    }

    #[test]
    fn upscales_tiny_images() {
        let mut resizer = CanonicalResizer::new(ResizeFilter::Nearest);
        let resized = resizer
            .resize_to_canonical(&create_gradient(3, 2), "tiny")
            .unwrap();

        assert_eq!(resized.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
    }

    #[test]
    fn solid_colour_survives_resizing() {
        let solid = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(37, 91, Rgb([10, 20, 30])));

        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
            let mut resizer = CanonicalResizer::new(filter);
            let resized = resizer.resize_to_canonical(&solid, "solid").unwrap();
            assert!(resized.pixels().all(|p| p.0 == [10, 20, 30]), "{} changed colours", filter);
        }
    }

    #[test]
    fn grey_and_alpha_images_become_rgb() {
        let mut resizer = CanonicalResizer::default();

        let grey = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([42])));
        let resized = resizer.resize_to_canonical(&grey, "grey").unwrap();
        assert!(resized.pixels().all(|p| p.0 == [42, 42, 42]));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 0])));
        let resized = resizer.resize_to_canonical(&rgba, "rgba").unwrap();
        assert!(resized.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut resizer = CanonicalResizer::default();
        let empty = DynamicImage::new_rgb8(0, 10);

        let result = resizer.resize_to_canonical(&empty, "empty.png");

        assert!(matches!(
            result,
            Err(SimilarityError::EmptyImage { width: 0, height: 10, .. })
        ));
    }

    #[test]
    fn split_channels_separates_planes() {
        let img = ImageBuffer::from_fn(2, 1, |x, _| Rgb([x as u8, 10 + x as u8, 20 + x as u8]));
        let [r, g, b] = split_channels(&img);

        assert_eq!(r, vec![0, 1]);
        assert_eq!(g, vec![10, 11]);
        assert_eq!(b, vec![20, 21]);
    }
}
