//! Geolocation engines.
//!
//! An engine turns an address into a [`Coordinate`] through one remote
//! service. Engines hold no state besides their endpoint, so one instance can
//! be shared freely between batch workers. Outcome policies and batching are
//! layered on top in [`crate::outcome`] and [`crate::batch`] and work for any
//! engine.

pub mod google_maps;
pub mod waze;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

use crate::api::FetchOptions;
use crate::domain::Coordinate;
use crate::error::{GeolocateError, Result};

pub use google_maps::GoogleMapsEngine;
pub use waze::WazeEngine;

/// A service that can geolocate addresses.
pub trait Engine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Resolve `address`, failing with [`GeolocateError::NotFound`] when the
    /// service answers without a usable result.
    fn resolve(&self, address: &str, options: &FetchOptions) -> Result<Coordinate>;
}

/// Built-in engines, selectable from the CLI or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    #[default]
    Waze,
    GoogleMaps,
}

impl EngineKind {
    /// Instantiate the engine, optionally pointed at a different endpoint.
    pub fn build(self, endpoint: Option<String>) -> Box<dyn Engine> {
        match (self, endpoint) {
            (EngineKind::Waze, None) => Box::new(WazeEngine::new()),
            (EngineKind::Waze, Some(url)) => Box::new(WazeEngine::with_endpoint(url)),
            (EngineKind::GoogleMaps, None) => Box::new(GoogleMapsEngine::new()),
            (EngineKind::GoogleMaps, Some(url)) => Box::new(GoogleMapsEngine::with_endpoint(url)),
        }
    }
}

/// Walk a fixed path of array indices into `value`.
pub(crate) fn at_path<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, &i| v.get(i))
}

/// Both numbers or not found. Non-numeric values count as missing.
pub(crate) fn coordinate_or_not_found(
    address: &str,
    latitude: Option<&Value>,
    longitude: Option<&Value>,
) -> Result<Coordinate> {
    match (
        latitude.and_then(Value::as_f64),
        longitude.and_then(Value::as_f64),
    ) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
        _ => Err(GeolocateError::NotFound(address.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_path_stops_on_short_arrays() {
        let v = json!([[1, [2, 3]]]);
        assert_eq!(at_path(&v, &[0, 1, 1]), Some(&json!(3)));
        assert_eq!(at_path(&v, &[0, 1, 5]), None);
        assert_eq!(at_path(&v, &[0, 0, 0]), None);
        assert_eq!(at_path(&v, &[]), Some(&v));
    }

    #[test]
    fn test_partial_coordinate_is_not_found() {
        let lat = json!(1.5);
        let err = coordinate_or_not_found("x", Some(&lat), None).unwrap_err();
        assert!(err.is_not_found());

        let text = json!("1.5");
        assert!(coordinate_or_not_found("x", Some(&text), Some(&lat)).is_err());
    }

    #[test]
    fn test_engine_kind_parses_from_config() {
        #[derive(Deserialize)]
        struct Wrapper {
            engine: EngineKind,
        }
        let w: Wrapper = toml::from_str(r#"engine = "google-maps""#).unwrap();
        assert_eq!(w.engine, EngineKind::GoogleMaps);
        assert_eq!(EngineKind::default(), EngineKind::Waze);
    }

    #[test]
    fn test_build_names_engines() {
        assert_eq!(EngineKind::Waze.build(None).name(), "waze");
        assert_eq!(
            EngineKind::GoogleMaps
                .build(Some("http://localhost/search".to_string()))
                .name(),
            "google-maps"
        );
    }
}
