use std::time::Duration;

/// Everything that can go wrong while geolocating an address.
#[derive(Debug, thiserror::Error)]
pub enum GeolocateError {
    /// The service answered, but the answer holds no coordinates.
    #[error("Address not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("{url} returned HTTP status {status}")]
    Http { status: u16, url: String },

    /// The body could not be decoded as JSON at all.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown callback: {0}")]
    UnknownCallback(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = GeolocateError> = std::result::Result<T, E>;

impl GeolocateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeolocateError::NotFound(_))
    }

    /// Failures worth another attempt at the transport level.
    pub fn is_transient(&self) -> bool {
        match self {
            GeolocateError::Network(_) | GeolocateError::Timeout { .. } => true,
            GeolocateError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}
