use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] unswachh_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] unswachh_store_lmdb::LmdbError),

    #[error("submission error: {0}")]
    Submission(#[from] unswachh_submission::SubmissionError),

    #[error("moderation error: {0}")]
    Moderation(#[from] unswachh_moderation::ModerationError),

    #[error("vote error: {0}")]
    Vote(#[from] unswachh_votes::VoteError),

    #[error("location error: {0}")]
    Geo(#[from] unswachh_geo::GeoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("database integrity check failed: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
