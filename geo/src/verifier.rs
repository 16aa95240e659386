//! Live location verification.
//!
//! A report may only be filed from where the reporter actually stands. The
//! [`GeoVerifier`] asks the device's positioning capability for a fresh fix on
//! every call and wraps the result in a [`VerifiedCoordinate`]. That type can
//! only be minted here, is not `Clone`, and is consumed by the submission it
//! accompanies, so neither a stale fix nor an arbitrary map click can stand in
//! for it.

use crate::error::GeoError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use unswachh_types::{Coordinate, Timestamp};

/// A position as reported by the device, before validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy, if the platform provides one.
    pub accuracy_m: Option<f64>,
}

/// Why the positioning capability could not produce a fix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PositionError {
    /// The device has no positioning capability.
    Unsupported,
    /// The user refused access or the platform reported an error.
    Denied(String),
}

/// The device's positioning capability.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Request the current position. May prompt the user.
    async fn current_position(&self) -> Result<RawPosition, PositionError>;
}

/// A coordinate that came from a live device fix.
#[derive(Debug)]
pub struct VerifiedCoordinate {
    coordinate: Coordinate,
    accuracy_m: Option<f64>,
    verified_at: Timestamp,
}

impl VerifiedCoordinate {
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn accuracy_m(&self) -> Option<f64> {
        self.accuracy_m
    }

    pub fn verified_at(&self) -> Timestamp {
        self.verified_at
    }

    /// Give up the verification wrapper once the coordinate has been used.
    pub fn into_coordinate(self) -> Coordinate {
        self.coordinate
    }
}

/// Obtains verified coordinates from a [`PositionProvider`].
pub struct GeoVerifier {
    provider: Arc<dyn PositionProvider>,
}

impl GeoVerifier {
    pub fn new(provider: Arc<dyn PositionProvider>) -> Self {
        Self { provider }
    }

    /// Ask the device for its position right now.
    ///
    /// Nothing is cached: every submission needs its own call.
    pub async fn verify(&self) -> Result<VerifiedCoordinate, GeoError> {
        let position = self
            .provider
            .current_position()
            .await
            .map_err(|e| match e {
                PositionError::Unsupported => GeoError::Unsupported,
                PositionError::Denied(reason) => GeoError::Denied(reason),
            })?;

        let coordinate = Coordinate::new(position.latitude, position.longitude).map_err(|_| {
            GeoError::InvalidCoordinate {
                latitude: position.latitude,
                longitude: position.longitude,
            }
        })?;

        debug!(%coordinate, accuracy_m = ?position.accuracy_m, "location verified");

        Ok(VerifiedCoordinate {
            coordinate,
            accuracy_m: position.accuracy_m,
            verified_at: Timestamp::now(),
        })
    }
}
