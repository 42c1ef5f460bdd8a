//! geolocate - Georeference addresses through public mapping endpoints

pub mod api;
pub mod batch;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod locate;
pub mod logging;
pub mod outcome;
pub mod retry;

pub use batch::BatchOptions;
pub use domain::Coordinate;
pub use engine::{Engine, EngineKind, GoogleMapsEngine, WazeEngine};
pub use error::GeolocateError;
pub use locate::{GeolocateOptions, geolocate, geolocate_batch};
pub use outcome::{Action, OnError, OnNotFound, OutcomePolicy};
