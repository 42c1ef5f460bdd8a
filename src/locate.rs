use std::time::Duration;

use crate::api::FetchOptions;
use crate::batch::{BatchOptions, resolve_batch};
use crate::domain::Coordinate;
use crate::engine::{Engine, WazeEngine};
use crate::error::Result;
use crate::outcome::{OnError, OnNotFound, OutcomePolicy, resolve_with_outcome};

/// Options shared by [`geolocate`] and [`geolocate_batch`].
#[derive(Debug, Clone, Default)]
pub struct GeolocateOptions {
    pub fetch: FetchOptions,
    pub outcome: OutcomePolicy,
}

impl GeolocateOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.timeout = timeout;
        self
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.fetch.tries = tries;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.fetch.backoff_factor = backoff_factor;
        self
    }

    pub fn on_not_found(mut self, action: OnNotFound) -> Self {
        self.outcome.on_not_found = action;
        self
    }

    pub fn on_error(mut self, action: OnError) -> Self {
        self.outcome.on_error = action;
        self
    }
}

/// Geolocate a single address.
///
/// Uses [`WazeEngine`] when `engine` is `None`.
///
/// ```no_run
/// use geolocate::{GeolocateOptions, geolocate};
///
/// let coordinate = geolocate("1 Infinite Loop, Cupertino, CA 95014", None, &GeolocateOptions::default())?;
/// println!("{:?}", coordinate.as_pair());
/// # Ok::<(), geolocate::GeolocateError>(())
/// ```
pub fn geolocate(
    address: &str,
    engine: Option<&dyn Engine>,
    options: &GeolocateOptions,
) -> Result<Coordinate> {
    match engine {
        Some(engine) => resolve_with_outcome(engine, address, &options.fetch, &options.outcome),
        None => resolve_with_outcome(
            &WazeEngine::new(),
            address,
            &options.fetch,
            &options.outcome,
        ),
    }
}

/// Geolocate many addresses in parallel, keeping input order.
///
/// Uses [`WazeEngine`] when `engine` is `None`.
pub fn geolocate_batch<S: AsRef<str> + Sync>(
    addresses: &[S],
    engine: Option<&dyn Engine>,
    options: &GeolocateOptions,
    batch: &BatchOptions,
) -> Result<Vec<Coordinate>> {
    match engine {
        Some(engine) => resolve_batch(engine, addresses, &options.fetch, &options.outcome, batch),
        None => resolve_batch(
            &WazeEngine::new(),
            addresses,
            &options.fetch,
            &options.outcome,
            batch,
        ),
    }
}
