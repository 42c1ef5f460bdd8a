use serde::{Deserialize, Serialize};

/// A resolved geographic position in WGS84.
///
/// Either both fields are present or both are absent. The absent form is what
/// the `ignore` outcome policy hands back for an address that could not be
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl Coordinate {
    /// The null coordinate: `{"latitude": null, "longitude": null}`.
    pub const NULL: Coordinate = Coordinate {
        latitude: None,
        longitude: None,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn is_null(&self) -> bool {
        self.as_pair().is_none()
    }

    /// Coordinates as a `(lat, lon)` pair, or `None` for the null coordinate.
    pub fn as_pair(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Wire form, checked before it becomes a [`Coordinate`].
#[derive(Deserialize)]
struct RawCoordinate {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = String;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        match (raw.latitude, raw.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Self::new(latitude, longitude)),
            (None, None) => Ok(Self::NULL),
            _ => Err("latitude and longitude must both be set or both be null".to_string()),
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}
