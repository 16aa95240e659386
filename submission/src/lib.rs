//! Turns a candidate report from the public into a persisted in-review record.

pub mod draft;
pub mod error;
pub mod pipeline;

pub use draft::ReportDraft;
pub use error::SubmissionError;
pub use pipeline::ReportSubmissionPipeline;
