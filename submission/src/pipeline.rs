//! The submission pipeline.
//!
//! Steps run in a fixed order and the first failure wins:
//!
//! 1. verified location present
//! 2. photo present
//! 3. title non-empty, link well-formed
//! 4. no existing report (any status) within the duplicate radius
//! 5. photo normalized and uploaded
//! 6. location label from the reverse geocoder (never fails)
//! 7. record created in review
//!
//! Nothing is written to the store before step 7.

use std::sync::Arc;

use unswachh_geo::{distance_m, DuplicateGuard, ReverseGeocoder};
use unswachh_media::ImagePipeline;
use unswachh_store::{NewReport, ReportFilter, ReportStore};
use unswachh_types::Report;

use crate::{ReportDraft, SubmissionError};

pub struct ReportSubmissionPipeline {
    store: Arc<dyn ReportStore>,
    images: Arc<dyn ImagePipeline>,
    geocoder: Arc<dyn ReverseGeocoder>,
    guard: DuplicateGuard,
}

fn check_link(link: &str) -> Result<(), SubmissionError> {
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .ok_or_else(|| SubmissionError::InvalidLink(link.to_string()))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || link.chars().any(char::is_whitespace) {
        return Err(SubmissionError::InvalidLink(link.to_string()));
    }
    Ok(())
}

/// Trimmed value, `None` when blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ReportSubmissionPipeline {
    pub fn new(
        store: Arc<dyn ReportStore>,
        images: Arc<dyn ImagePipeline>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        Self {
            store,
            images,
            geocoder,
            guard: DuplicateGuard::new(),
        }
    }

    pub fn with_guard(mut self, guard: DuplicateGuard) -> Self {
        self.guard = guard;
        self
    }

    pub async fn submit(&self, draft: ReportDraft) -> Result<Report, SubmissionError> {
        let result = self.run(draft).await;
        match &result {
            Ok(report) => tracing::info!(
                report = %report.id,
                location = %report.location,
                "report submitted for review"
            ),
            Err(e) if e.is_user_correctable() => {
                tracing::warn!(reason = e.reason(), error = %e, "submission rejected")
            }
            Err(e) => tracing::warn!(reason = e.reason(), error = %e, "submission failed"),
        }
        result
    }

    async fn run(&self, draft: ReportDraft) -> Result<Report, SubmissionError> {
        let location = draft
            .location
            .ok_or(SubmissionError::MissingLocation)?
            .into_coordinate();
        let image = draft.image.ok_or(SubmissionError::MissingImage)?;

        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(SubmissionError::EmptyTitle);
        }
        let external_link = non_blank(draft.external_link);
        if let Some(link) = &external_link {
            check_link(link)?;
        }

        // The scan is not isolated from concurrent submissions; two reports
        // landing at the same spot at the same moment can both pass.
        let existing = self
            .store
            .list(ReportFilter::All)
            .map_err(|e| SubmissionError::PersistenceFailed(e.to_string()))?;
        if let Some(nearby) = self.guard.find_nearby(&location, &existing) {
            return Err(SubmissionError::DuplicateNearby {
                existing: nearby.id,
                distance_m: distance_m(&location, &nearby.location),
            });
        }

        let compressed = self
            .images
            .normalize(image)
            .await
            .map_err(|e| SubmissionError::UploadFailed(e.to_string()))?;
        let image_url = self
            .images
            .upload(compressed)
            .await
            .map_err(|e| SubmissionError::UploadFailed(e.to_string()))?;

        let location_name = self.geocoder.label_for(&location).await;

        self.store
            .create(NewReport {
                title,
                description: non_blank(draft.description),
                image_url: image_url.into_string(),
                location_name,
                location,
                external_link,
            })
            .map_err(|e| SubmissionError::PersistenceFailed(e.to_string()))
    }
}
