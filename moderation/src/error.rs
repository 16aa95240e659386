use thiserror::Error;
use unswachh_types::ReportId;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("admin credentials rejected")]
    Unauthorized,

    #[error("report {0} not found")]
    NotFound(ReportId),

    #[error("moderation change could not be persisted: {0}")]
    PersistenceFailed(String),
}
