//! HTTP upload of normalized images to a Cloudinary-style endpoint.

use crate::{CompressedImage, ImageRef, MediaError};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Default Cloudinary API host.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.cloudinary.com";

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Unsigned uploader: `POST {base}/v1_1/{cloud}/image/upload` with an upload preset.
pub struct CloudinaryUploader {
    http_client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

/// The part of the upload response we care about.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl CloudinaryUploader {
    pub fn new(base_url: &str, cloud_name: &str, upload_preset: &str, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name)
    }

    pub async fn upload(&self, image: CompressedImage) -> Result<ImageRef, MediaError> {
        let size = image.bytes.len();
        let part = Part::bytes(image.bytes)
            .file_name("report.jpg")
            .mime_str(image.content_type)
            .map_err(|e| MediaError::UploadFailed(e.to_string()))?;
        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);

        let response = self
            .http_client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::UploadFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| MediaError::InvalidResponse("no url in upload response".into()))?;

        info!(bytes = size, %url, "image uploaded");
        Ok(ImageRef::new(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_cloud_name() {
        let uploader = CloudinaryUploader::new(
            "https://upload.example/",
            "demo",
            "unsigned",
            Duration::from_secs(30),
        );
        assert_eq!(uploader.endpoint(), "https://upload.example/v1_1/demo/image/upload");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_upload_failure() {
        let uploader = CloudinaryUploader::new(
            "http://127.0.0.1:9",
            "demo",
            "unsigned",
            Duration::from_millis(200),
        );
        let image = CompressedImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            width: 1,
            height: 1,
            content_type: "image/jpeg",
        };
        assert!(matches!(
            uploader.upload(image).await,
            Err(MediaError::UploadFailed(_))
        ));
    }
}
