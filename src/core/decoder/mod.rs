//! # Decoder Module
//!
//! Turns image identifiers (file paths or in-memory buffers) into decoded
//! rasters for the scorer.
//!
//! ## Decoding Strategy
//! - Sniff magic bytes, never the file name, to spot JPEGs
//! - JPEG: zune-jpeg (1.5-2x faster), image crate as fallback
//! - Everything else, recognised or not: image crate, which guesses the format itself
//! - Files of 1MB or more are memory-mapped
//!
//! Empty and corrupted input always fails with a decode error.

pub mod mmap;

use crate::error::SimilarityError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Extensions accepted for reference images
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Check an identifier's extension against [`ALLOWED_EXTENSIONS`]
pub fn has_allowed_extension(identifier: &str) -> bool {
    Path::new(identifier)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
}

/// An opaque handle to an image that has not been decoded yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image file on disk
    Path(PathBuf),
    /// Encoded image held in memory
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    /// Create a source for an in-memory buffer
    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Human-readable name used in errors and logs
    pub fn name(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Encoded formats recognised from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of an encoded image
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 {
            return None;
        }

        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }
}

/// Decodes image identifiers into rasters
pub trait Decoder: Send + Sync {
    /// Decode an image, failing on unreadable or malformed input
    fn decode(&self, source: &ImageSource) -> Result<DynamicImage, SimilarityError>;
}

/// Fast image decoder that uses optimized decoders per format
#[derive(Debug, Clone, Copy, Default)]
pub struct FastDecoder;

impl FastDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode an encoded buffer.
    ///
    /// `name` only labels errors.
    pub fn decode_bytes(&self, name: &str, bytes: &[u8]) -> Result<DynamicImage, SimilarityError> {
        if bytes.is_empty() {
            return Err(SimilarityError::decode(name, "buffer is empty"));
        }

        let format = ImageFormat::sniff(bytes);

        debug!(source = name, ?format, size = bytes.len(), "Decoding image");

        match format {
            Some(ImageFormat::Jpeg) => Self::decode_jpeg(name, bytes).or_else(|e| {
                warn!(source = name, error = %e, "zune-jpeg failed, falling back to image crate");
                Self::decode_fallback(name, bytes)
            }),
            _ => Self::decode_fallback(name, bytes),
        }
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(name: &str, bytes: &[u8]) -> Result<DynamicImage, SimilarityError> {
        // Configure decoder to output RGB
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| SimilarityError::decode(name, format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| SimilarityError::decode(name, "failed to get JPEG info"))?;

        let width = info.width as u32;
        let height = info.height as u32;

        let buffer_error = || SimilarityError::decode(name, "decoded pixel buffer has wrong length");

        // Get actual output colorspace after decoding
        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(buffer_error)?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(buffer_error)?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(buffer_error)?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(SimilarityError::decode(
                    name,
                    format!("unsupported JPEG colorspace {:?}", other),
                ))
            }
        };

        Ok(image)
    }

    /// Decode with the image crate
    fn decode_fallback(name: &str, bytes: &[u8]) -> Result<DynamicImage, SimilarityError> {
        image::load_from_memory(bytes).map_err(|e| SimilarityError::decode(name, e.to_string()))
    }
}

impl Decoder for FastDecoder {
    fn decode(&self, source: &ImageSource) -> Result<DynamicImage, SimilarityError> {
        match source {
            ImageSource::Path(path) => {
                let bytes = mmap::read_file_bytes(path)?;
                self.decode_bytes(&path.display().to_string(), &bytes)
            }
            ImageSource::Bytes { name, data } => self.decode_bytes(name, data),
        }
    }
}
