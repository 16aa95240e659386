use unswachh_geo::VerifiedCoordinate;
use unswachh_media::RawImage;

/// A candidate report as filled in by the submitter.
///
/// The location can only come from [`unswachh_geo::GeoVerifier`] and is
/// consumed by the submission that uses it.
#[derive(Debug, Default)]
pub struct ReportDraft {
    pub location: Option<VerifiedCoordinate>,
    pub image: Option<RawImage>,
    pub title: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
}

impl ReportDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: VerifiedCoordinate) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_image(mut self, image: RawImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = Some(link.into());
        self
    }
}
