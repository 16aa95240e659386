use thiserror::Error;
use unswachh_types::ReportId;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("report {0} not found")]
    ReportNotFound(ReportId),

    #[error("report {0} is not open for voting")]
    NotVotable(ReportId),

    #[error("vote could not be recorded: {0}")]
    Store(String),
}
