//! Image pipeline for report evidence photos.
//!
//! Submissions hand their raw photo to an [`ImagePipeline`], which first
//! normalizes it (bounded dimensions, JPEG re-encode) and then uploads it,
//! returning an opaque [`ImageRef`] to store on the report.

pub mod error;
pub mod normalize;
pub mod upload;

pub use error::MediaError;
pub use normalize::{JpegNormalizer, NormalizeOptions};
pub use upload::CloudinaryUploader;

use async_trait::async_trait;
use std::fmt;

/// A photo exactly as supplied by the reporter.
#[derive(Clone, Debug)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
        }
    }
}

/// A normalized photo, ready for upload.
#[derive(Clone, Debug)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

/// Handle of an uploaded image (usually a URL).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize-then-upload boundary used by the submission pipeline.
#[async_trait]
pub trait ImagePipeline: Send + Sync {
    async fn normalize(&self, raw: RawImage) -> Result<CompressedImage, MediaError>;

    async fn upload(&self, image: CompressedImage) -> Result<ImageRef, MediaError>;
}

/// The production pipeline: [`JpegNormalizer`] followed by [`CloudinaryUploader`].
pub struct MediaPipeline {
    normalizer: JpegNormalizer,
    uploader: CloudinaryUploader,
}

impl MediaPipeline {
    pub fn new(normalizer: JpegNormalizer, uploader: CloudinaryUploader) -> Self {
        Self {
            normalizer,
            uploader,
        }
    }
}

#[async_trait]
impl ImagePipeline for MediaPipeline {
    async fn normalize(&self, raw: RawImage) -> Result<CompressedImage, MediaError> {
        let normalizer = self.normalizer.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize(&raw))
            .await
            .map_err(|e| MediaError::Encode(format!("normalize task failed: {e}")))?
    }

    async fn upload(&self, image: CompressedImage) -> Result<ImageRef, MediaError> {
        self.uploader.upload(image).await
    }
}
