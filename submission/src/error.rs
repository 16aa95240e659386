use thiserror::Error;
use unswachh_types::ReportId;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("a verified location is required")]
    MissingLocation,

    #[error("a photo is required")]
    MissingImage,

    #[error("a title is required")]
    EmptyTitle,

    #[error("invalid link: {0}")]
    InvalidLink(String),

    #[error("report {existing} already covers this spot ({distance_m:.1} m away)")]
    DuplicateNearby { existing: ReportId, distance_m: f64 },

    #[error("photo upload failed: {0}")]
    UploadFailed(String),

    #[error("report could not be saved: {0}")]
    PersistenceFailed(String),
}

impl SubmissionError {
    /// Whether the submitter can fix this by changing the draft.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::MissingLocation
                | Self::MissingImage
                | Self::EmptyTitle
                | Self::InvalidLink(_)
                | Self::DuplicateNearby { .. }
        )
    }

    /// Short stable label, used as a metrics dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingLocation => "missing_location",
            Self::MissingImage => "missing_image",
            Self::EmptyTitle => "empty_title",
            Self::InvalidLink(_) => "invalid_link",
            Self::DuplicateNearby { .. } => "duplicate_nearby",
            Self::UploadFailed(_) => "upload_failed",
            Self::PersistenceFailed(_) => "persistence_failed",
        }
    }
}
