use serde_json::Value;

use super::{Engine, at_path, coordinate_or_not_found};
use crate::api::{FetchOptions, fetch};
use crate::domain::Coordinate;
use crate::error::{GeolocateError, Result};

/// Map search endpoint behind google.com/maps.
pub const GOOGLE_MAPS_URL: &str = "https://www.google.com/search";

/// Index path from the root of the search payload to the
/// `[_, _, lat, lon]` block of the top result.
const POSITION_PATH: &[usize] = &[0, 1, 0, 14, 9];

/// Geolocates through the Google Maps search endpoint.
#[derive(Debug, Clone)]
pub struct GoogleMapsEngine {
    endpoint: String,
}

impl Default for GoogleMapsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleMapsEngine {
    pub fn new() -> Self {
        Self::with_endpoint(GOOGLE_MAPS_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Engine for GoogleMapsEngine {
    fn name(&self) -> &str {
        "google-maps"
    }

    fn resolve(&self, address: &str, options: &FetchOptions) -> Result<Coordinate> {
        let response = fetch(
            &self.endpoint,
            &[("tbm", "map"), ("q", address), ("oq", address)],
            options,
        )?
        .error_for_status()?;

        parse_response(address, &response.body)
    }
}

/// Decode the search payload and pull out the top result's position.
pub fn parse_response(address: &str, body: &str) -> Result<Coordinate> {
    let data = decode_payload(body)?;
    let position = at_path(&data, POSITION_PATH);
    coordinate_or_not_found(
        address,
        position.and_then(|p| p.get(2)),
        position.and_then(|p| p.get(3)),
    )
}

/// The body is either plain JSON or a guard line (`)]}'`) followed by JSON,
/// sometimes with trailing junk after the document.
fn decode_payload(body: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    let (_, rest) = body.split_once('\n').ok_or_else(|| {
        GeolocateError::InvalidResponse("Google Maps: body is not JSON".to_string())
    })?;

    match serde_json::Deserializer::from_str(rest).into_iter::<Value>().next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(GeolocateError::InvalidResponse(format!(
            "Google Maps: {}",
            e
        ))),
        None => Err(GeolocateError::InvalidResponse(
            "Google Maps: empty payload".to_string(),
        )),
    }
}
