//! Nullable image pipeline: records uploads instead of sending them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use unswachh_media::{CompressedImage, ImagePipeline, ImageRef, MediaError, RawImage};

/// An image pipeline that passes bytes through and hands out fake URLs.
pub struct NullImagePipeline {
    uploads: Mutex<Vec<CompressedImage>>,
    fail_uploads: AtomicBool,
}

impl NullImagePipeline {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent upload fail (or succeed again).
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful uploads.
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

impl Default for NullImagePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImagePipeline for NullImagePipeline {
    async fn normalize(&self, raw: RawImage) -> Result<CompressedImage, MediaError> {
        if raw.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        Ok(CompressedImage {
            bytes: raw.bytes,
            width: 1,
            height: 1,
            content_type: "image/jpeg",
        })
    }

    async fn upload(&self, image: CompressedImage) -> Result<ImageRef, MediaError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::UploadFailed("null pipeline set to fail".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(image);
        Ok(ImageRef::new(format!(
            "https://media.invalid/upload/{}.jpg",
            uploads.len()
        )))
    }
}
