//! Bounded-size JPEG normalization.

use crate::{CompressedImage, MediaError, RawImage};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Knobs for [`JpegNormalizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Longest side after normalization, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// Raw payloads above this size are refused before decoding.
    pub max_upload_bytes: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            quality: 80,
            max_upload_bytes: 15 * 1024 * 1024,
        }
    }
}

/// Decodes any supported format, shrinks it to fit, and re-encodes as JPEG.
#[derive(Clone, Debug, Default)]
pub struct JpegNormalizer {
    options: NormalizeOptions,
}

impl JpegNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    pub fn normalize(&self, raw: &RawImage) -> Result<CompressedImage, MediaError> {
        if raw.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if raw.bytes.len() > self.options.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size: raw.bytes.len(),
                max: self.options.max_upload_bytes,
            });
        }

        let decoded =
            image::load_from_memory(&raw.bytes).map_err(|e| MediaError::Decode(e.to_string()))?;
        let (width, height) = decoded.dimensions();

        let max = self.options.max_dimension;
        let resized = if width > max || height > max {
            decoded.resize(max, max, FilterType::Triangle)
        } else {
            decoded
        };

        // JPEG has no alpha channel.
        let rgb = resized.to_rgb8();
        let mut bytes = Vec::new();
        {
            let mut encoder =
                JpegEncoder::new_with_quality(&mut bytes, self.options.quality.clamp(1, 100));
            encoder
                .encode_image(&rgb)
                .map_err(|e| MediaError::Encode(e.to_string()))?;
        }

        debug!(
            from = %format!("{width}x{height}"),
            to = %format!("{}x{}", rgb.width(), rgb.height()),
            in_bytes = raw.bytes.len(),
            out_bytes = bytes.len(),
            "image normalized"
        );

        Ok(CompressedImage {
            bytes,
            width: rgb.width(),
            height: rgb.height(),
            content_type: "image/jpeg",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([200u8, 30, 30, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn shrinks_longest_side_and_keeps_aspect() {
        let normalizer = JpegNormalizer::new(NormalizeOptions {
            max_dimension: 400,
            ..NormalizeOptions::default()
        });
        let out = normalizer.normalize(&RawImage::new(png(1200, 600))).unwrap();
        assert_eq!((out.width, out.height), (400, 200));
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn small_images_keep_their_size() {
        let out = JpegNormalizer::default()
            .normalize(&RawImage::new(png(64, 48)))
            .unwrap();
        assert_eq!((out.width, out.height), (64, 48));
    }

    #[test]
    fn rejects_empty_oversized_and_garbage() {
        let normalizer = JpegNormalizer::new(NormalizeOptions {
            max_upload_bytes: 10,
            ..NormalizeOptions::default()
        });
        assert!(matches!(normalizer.normalize(&RawImage::new(Vec::new())), Err(MediaError::Empty)));
        assert!(matches!(
            normalizer.normalize(&RawImage::new(vec![0u8; 11])),
            Err(MediaError::TooLarge { size: 11, max: 10 })
        ));
        assert!(matches!(
            JpegNormalizer::default().normalize(&RawImage::new(b"not an image".to_vec())),
            Err(MediaError::Decode(_))
        ));
    }
}
