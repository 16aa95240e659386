//! Nullable position provider and reverse geocoder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use unswachh_geo::{PositionError, PositionProvider, RawPosition, ReverseGeocoder};
use unswachh_types::report::LOCATION_UNAVAILABLE;
use unswachh_types::Coordinate;

/// A position provider that answers with a scripted result.
pub struct NullPositionProvider {
    answer: Mutex<Result<RawPosition, PositionError>>,
    calls: AtomicUsize,
}

impl NullPositionProvider {
    /// Grants permission and reports the given fix.
    pub fn granted(latitude: f64, longitude: f64) -> Self {
        Self::scripted(Ok(RawPosition {
            latitude,
            longitude,
            accuracy_m: Some(5.0),
        }))
    }

    /// The user refuses permission.
    pub fn denied(reason: &str) -> Self {
        Self::scripted(Err(PositionError::Denied(reason.to_string())))
    }

    /// The device has no positioning capability.
    pub fn unsupported() -> Self {
        Self::scripted(Err(PositionError::Unsupported))
    }

    pub fn scripted(answer: Result<RawPosition, PositionError>) -> Self {
        Self {
            answer: Mutex::new(answer),
            calls: AtomicUsize::new(0),
        }
    }

    /// Move the device: later calls report this fix.
    pub fn move_to(&self, latitude: f64, longitude: f64) {
        *self.answer.lock().unwrap() = Ok(RawPosition {
            latitude,
            longitude,
            accuracy_m: Some(5.0),
        });
    }

    /// Number of times the position was requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionProvider for NullPositionProvider {
    async fn current_position(&self) -> Result<RawPosition, PositionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.lock().unwrap().clone()
    }
}

/// A reverse geocoder with a fixed answer.
pub struct NullGeocoder {
    label: Option<String>,
    lookups: Mutex<Vec<Coordinate>>,
}

impl NullGeocoder {
    /// Always resolves to `label`.
    pub fn with_label(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like an unreachable geocoding service.
    pub fn unavailable() -> Self {
        Self {
            label: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Every coordinate that was looked up (for assertions).
    pub fn lookups(&self) -> Vec<Coordinate> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Default for NullGeocoder {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[async_trait]
impl ReverseGeocoder for NullGeocoder {
    async fn label_for(&self, coordinate: &Coordinate) -> String {
        self.lookups.lock().unwrap().push(*coordinate);
        self.label
            .clone()
            .unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_positions() {
        let provider = NullPositionProvider::denied("user said no");
        assert_eq!(
            provider.current_position().await,
            Err(PositionError::Denied("user said no".to_string()))
        );
        provider.move_to(12.0, 77.0);
        assert_eq!(provider.current_position().await.unwrap().latitude, 12.0);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unavailable_geocoder_yields_placeholder() {
        let geocoder = NullGeocoder::unavailable();
        let c = Coordinate::new(1.0, 2.0).unwrap();
        assert_eq!(geocoder.label_for(&c).await, LOCATION_UNAVAILABLE);
        assert_eq!(geocoder.lookups(), vec![c]);
    }
}
