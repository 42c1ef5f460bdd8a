//! What to do when an address is not found or resolution fails.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::FetchOptions;
use crate::domain::Coordinate;
use crate::engine::Engine;
use crate::error::{GeolocateError, Result};

pub type NotFoundHandler = dyn Fn(&str) -> Coordinate + Send + Sync;
pub type ErrorHandler = dyn Fn(&str, &GeolocateError) -> Coordinate + Send + Sync;

/// Reaction to one class of failure.
pub enum Action<F: ?Sized> {
    /// Hand back [`Coordinate::NULL`].
    Ignore,
    /// Return the error to the caller.
    Raise,
    /// Let the handler produce the coordinate; its value is returned as is.
    Custom(Arc<F>),
}

pub type OnNotFound = Action<NotFoundHandler>;
pub type OnError = Action<ErrorHandler>;

impl OnNotFound {
    /// `handler` receives the address that was not found.
    pub fn custom(handler: impl Fn(&str) -> Coordinate + Send + Sync + 'static) -> Self {
        let handler: Arc<NotFoundHandler> = Arc::new(handler);
        Action::Custom(handler)
    }
}

impl OnError {
    /// `handler` receives the address and the error it ran into.
    pub fn custom(
        handler: impl Fn(&str, &GeolocateError) -> Coordinate + Send + Sync + 'static,
    ) -> Self {
        let handler: Arc<ErrorHandler> = Arc::new(handler);
        Action::Custom(handler)
    }
}

impl<F: ?Sized> Clone for Action<F> {
    fn clone(&self) -> Self {
        match self {
            Action::Ignore => Action::Ignore,
            Action::Raise => Action::Raise,
            Action::Custom(f) => Action::Custom(Arc::clone(f)),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Action<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ignore => write!(f, "Ignore"),
            Action::Raise => write!(f, "Raise"),
            Action::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Only the two sentinels have a textual form; handlers are passed as code.
/// Matching is exact: `"Ignore"` or `" raise"` are unknown.
impl<F: ?Sized> FromStr for Action<F> {
    type Err = GeolocateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ignore" => Ok(Action::Ignore),
            "raise" => Ok(Action::Raise),
            _ => Err(GeolocateError::UnknownCallback(s.to_string())),
        }
    }
}

/// The pair of reactions applied around a single resolution.
#[derive(Debug, Clone)]
pub struct OutcomePolicy {
    pub on_not_found: OnNotFound,
    pub on_error: OnError,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        Self {
            on_not_found: Action::Ignore,
            on_error: Action::Raise,
        }
    }
}

impl OutcomePolicy {
    /// Build from textual settings (config file, command line).
    ///
    /// Fails with [`GeolocateError::UnknownCallback`] if either value is not
    /// `ignore` or `raise`, whatever the other one says.
    pub fn parse(on_not_found: &str, on_error: &str) -> Result<Self> {
        Ok(Self {
            on_not_found: on_not_found.parse()?,
            on_error: on_error.parse()?,
        })
    }
}

/// Resolve one address and apply `policy` to whatever went wrong.
///
/// Configuration errors are always returned; they are never handed to a
/// policy.
pub fn resolve_with_outcome<E: Engine + ?Sized>(
    engine: &E,
    address: &str,
    fetch: &FetchOptions,
    policy: &OutcomePolicy,
) -> Result<Coordinate> {
    fetch.validate()?;

    let error = match engine.resolve(address, fetch) {
        Ok(coordinate) => return Ok(coordinate),
        Err(e) => e,
    };

    match error {
        GeolocateError::InvalidConfig(_) | GeolocateError::UnknownCallback(_) => Err(error),
        GeolocateError::NotFound(_) => match &policy.on_not_found {
            Action::Ignore => {
                tracing::debug!("{}: no result for {:?}", engine.name(), address);
                Ok(Coordinate::NULL)
            }
            Action::Raise => Err(error),
            Action::Custom(handler) => Ok(handler(address)),
        },
        _ => match &policy.on_error {
            Action::Ignore => {
                tracing::warn!("{}: failed on {:?}: {}", engine.name(), address, error);
                Ok(Coordinate::NULL)
            }
            Action::Raise => Err(error),
            Action::Custom(handler) => Ok(handler(address, &error)),
        },
    }
}
