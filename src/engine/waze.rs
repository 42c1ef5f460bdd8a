use serde_json::Value;

use super::{Engine, at_path, coordinate_or_not_found};
use crate::api::{FetchOptions, fetch};
use crate::domain::Coordinate;
use crate::error::{GeolocateError, Result};

/// Autocomplete endpoint used by the Waze web client.
pub const WAZE_URL: &str = "https://gapi.waze.com/autocomplete/q";

/// Geolocates through Waze's public autocomplete API.
#[derive(Debug, Clone)]
pub struct WazeEngine {
    endpoint: String,
}

impl Default for WazeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WazeEngine {
    pub fn new() -> Self {
        Self::with_endpoint(WAZE_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Engine for WazeEngine {
    fn name(&self) -> &str {
        "waze"
    }

    fn resolve(&self, address: &str, options: &FetchOptions) -> Result<Coordinate> {
        let response = fetch(
            &self.endpoint,
            &[("q", address), ("e", "ALL"), ("c", "web")],
            options,
        )?
        .error_for_status()?;

        parse_response(address, &response.body)
    }
}

/// Extract the first suggestion's position.
///
/// The body looks like `["query", [[name, _, _, {"x": lon, "y": lat}], ...]]`.
/// Anything that does not reach a numeric `x`/`y` is treated as not found.
pub fn parse_response(address: &str, body: &str) -> Result<Coordinate> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| GeolocateError::InvalidResponse(format!("Waze: {}", e)))?;

    let geometry = at_path(&data, &[1, 0, 3]);
    coordinate_or_not_found(
        address,
        geometry.and_then(|g| g.get("y")),
        geometry.and_then(|g| g.get("x")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{TestServer, http_response};
    use std::time::Duration;

    const PARIS: &str =
        r#"["Paris",[["Paris","France",null,{"x":2.35,"y":48.85},"ChIJ",null]]]"#;

    #[test]
    fn test_parse_first_suggestion() {
        let coordinate = parse_response("Paris", PARIS).unwrap();
        assert_eq!(coordinate, Coordinate::new(48.85, 2.35));
    }

    #[test]
    fn test_empty_suggestions_are_not_found() {
        let err = parse_response("Nowhere", r#"["Nowhere",[]]"#).unwrap_err();
        assert!(matches!(err, GeolocateError::NotFound(ref a) if a == "Nowhere"));

        let err = parse_response("Nowhere", r#"["Nowhere"]"#).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_geometry_keys_are_not_found() {
        let body = r#"["Paris",[["Paris","France",null,{"x":2.35}]]]"#;
        assert!(parse_response("Paris", body).unwrap_err().is_not_found());

        let body = r#"["Paris",[["Paris","France"]]]"#;
        assert!(parse_response("Paris", body).unwrap_err().is_not_found());

        let body = r#"{"error":"bad request"}"#;
        assert!(parse_response("Paris", body).unwrap_err().is_not_found());
    }

    #[test]
    fn test_garbage_body_is_an_error_not_a_miss() {
        let err = parse_response("Paris", "<html>").unwrap_err();
        assert!(matches!(err, GeolocateError::InvalidResponse(_)));
    }

    #[test]
    fn test_resolve_sends_autocomplete_query() {
        let server = TestServer::serve(vec![http_response(200, PARIS)]);
        let engine = WazeEngine::with_endpoint(server.url("/autocomplete/q"));
        let options = FetchOptions {
            timeout: Duration::from_secs(5),
            tries: 1,
            backoff_factor: 0.001,
        };

        let coordinate = engine.resolve("Eiffel Tower", &options).unwrap();

        assert_eq!(coordinate.as_pair(), Some((48.85, 2.35)));
        let requests = server.finish();
        assert!(
            requests[0].starts_with("GET /autocomplete/q?q=Eiffel+Tower&e=ALL&c=web "),
            "{}",
            requests[0]
        );
    }

    #[test]
    fn test_http_error_is_not_a_miss() {
        let server = TestServer::serve(vec![http_response(403, "[]")]);
        let engine = WazeEngine::with_endpoint(server.url("/"));
        let options = FetchOptions {
            timeout: Duration::from_secs(5),
            tries: 1,
            backoff_factor: 0.001,
        };

        let err = engine.resolve("Paris", &options).unwrap_err();
        assert!(matches!(err, GeolocateError::Http { status: 403, .. }));
    }
}
