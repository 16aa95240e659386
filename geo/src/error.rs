use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("location access denied: {0}")]
    Denied(String),

    #[error("device reported an invalid position: lat {latitude}, lon {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("geocoding service unreachable: {0}")]
    Unreachable(String),

    #[error("invalid response from geocoding service: {0}")]
    InvalidResponse(String),
}
