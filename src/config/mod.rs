use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::FetchOptions;
use crate::batch::BatchOptions;
use crate::engine::{Engine, EngineKind};
use crate::error::{GeolocateError, Result};
use crate::outcome::OutcomePolicy;

/// Defaults applied when neither the caller nor a config file says otherwise.
pub mod defaults {
    use std::time::Duration;

    pub const TIMEOUT: Duration = Duration::from_secs(10);
    pub const TRIES: u32 = 5;
    /// Seconds before the first transport retry.
    pub const BACKOFF_FACTOR: f64 = 0.5;
    pub const ON_NOT_FOUND: &str = "ignore";
    pub const ON_ERROR: &str = "raise";
}

fn default_timeout_secs() -> f64 {
    defaults::TIMEOUT.as_secs_f64()
}
fn default_tries() -> u32 {
    defaults::TRIES
}
fn default_backoff_factor() -> f64 {
    defaults::BACKOFF_FACTOR
}
fn default_on_not_found() -> String {
    defaults::ON_NOT_FOUND.to_string()
}
fn default_on_error() -> String {
    defaults::ON_ERROR.to_string()
}
fn default_progress() -> bool {
    true
}

/// Settings read from `geolocate.toml`.
///
/// ```toml
/// engine = "waze"
/// timeout_secs = 10
/// tries = 5
/// backoff_factor = 0.5
/// on_not_found = "ignore"
/// on_error = "raise"
/// workers = 8
///
/// [endpoints]
/// waze = "https://gapi.waze.com/autocomplete/q"
/// ```
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_tries")]
    pub tries: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_on_not_found")]
    pub on_not_found: String,
    #[serde(default = "default_on_error")]
    pub on_error: String,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_progress")]
    pub progress: bool,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Alternative URLs for the built-in engines.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct EndpointsConfig {
    #[serde(default)]
    pub waze: Option<String>,
    #[serde(default)]
    pub google_maps: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            timeout_secs: default_timeout_secs(),
            tries: default_tries(),
            backoff_factor: default_backoff_factor(),
            on_not_found: default_on_not_found(),
            on_error: default_on_error(),
            workers: None,
            progress: default_progress(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl FileConfig {
    /// First config file found on the search path, if any parses.
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(config) => {
                    tracing::debug!("loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => tracing::warn!("skipping config file {}: {}", path.display(), e),
            }
        }
        None
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GeolocateError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| GeolocateError::InvalidConfig(e.to_string()))
    }

    pub fn fetch_options(&self) -> Result<FetchOptions> {
        let timeout = Duration::try_from_secs_f64(self.timeout_secs).map_err(|e| {
            GeolocateError::InvalidConfig(format!("timeout_secs = {}: {}", self.timeout_secs, e))
        })?;
        let options = FetchOptions {
            timeout,
            tries: self.tries,
            backoff_factor: self.backoff_factor,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn outcome_policy(&self) -> Result<OutcomePolicy> {
        OutcomePolicy::parse(&self.on_not_found, &self.on_error)
    }

    pub fn batch_options(&self) -> Result<BatchOptions> {
        let options = BatchOptions {
            workers: self.workers,
            progress: self.progress,
        };
        options.validate()?;
        Ok(options)
    }

    /// The selected engine, pointed at its configured endpoint if one is set.
    pub fn engine(&self) -> Box<dyn Engine> {
        let endpoint = match self.engine {
            EngineKind::Waze => self.endpoints.waze.clone(),
            EngineKind::GoogleMaps => self.endpoints.google_maps.clone(),
        };
        self.engine.build(endpoint)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("geolocate.toml"));
    paths.push(PathBuf::from(".geolocate.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("geolocate").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".geolocate.toml"));
    }

    paths
}
