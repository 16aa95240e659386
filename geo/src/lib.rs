//! Location handling for report submissions.
//!
//! - [`verifier`]: live device positioning, the only source of a [`VerifiedCoordinate`].
//! - [`distance`]: haversine great-circle distance.
//! - [`duplicate`]: the 50 m proximity guard against repeated reports.
//! - [`geocode`]: best-effort reverse geocoding into a place label.
//! - [`region`]: grouping of reports by the region part of their label.
//! - [`links`]: map and deep links for a location.

pub mod distance;
pub mod duplicate;
pub mod error;
pub mod geocode;
pub mod links;
pub mod region;
pub mod verifier;

pub use distance::{distance_m, haversine_m, EARTH_RADIUS_M};
pub use duplicate::{DuplicateGuard, DUPLICATE_RADIUS_M};
pub use error::{GeoError, GeocodeError};
pub use geocode::{NominatimGeocoder, ReverseGeocoder};
pub use region::{group_by_region, region_of};
pub use verifier::{GeoVerifier, PositionError, PositionProvider, RawPosition, VerifiedCoordinate};
