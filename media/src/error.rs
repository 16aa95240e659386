use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image is empty")]
    Empty,

    #[error("image too large: {size} bytes, limit {max}")]
    TooLarge { size: usize, max: usize },

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("invalid response from upload service: {0}")]
    InvalidResponse(String),
}
