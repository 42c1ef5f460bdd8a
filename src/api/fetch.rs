use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;

use crate::config::defaults;
use crate::error::{GeolocateError, Result};
use crate::retry::{RetryPolicy, run_with_retry};

const USER_AGENT: &str = concat!("geolocate/", env!("CARGO_PKG_VERSION"));

/// Per-call transport settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchOptions {
    /// Timeout for one attempt; retries each get a fresh budget.
    pub timeout: Duration,
    /// Total attempts, including the first.
    pub tries: u32,
    /// Seconds to wait before the first retry; doubles on every further one.
    pub backoff_factor: f64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: defaults::TIMEOUT,
            tries: defaults::TRIES,
            backoff_factor: defaults::BACKOFF_FACTOR,
        }
    }
}

impl FetchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(GeolocateError::InvalidConfig(
                "timeout must be positive".to_string(),
            ));
        }
        RetryPolicy::transport(self.tries, self.backoff_factor).map(|_| ())
    }
}

/// Status, headers and body of a completed request. The body is not inspected.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Turns a 4xx/5xx status into [`GeolocateError::Http`].
    pub fn error_for_status(self) -> Result<Self> {
        if (400..=599).contains(&self.status) {
            return Err(GeolocateError::Http {
                status: self.status,
                url: self.url,
            });
        }
        Ok(self)
    }
}

/// GET `url` with the given query parameters.
///
/// Connection failures, timeouts, 5xx and 429 responses are retried with
/// exponential backoff. One client (and so one connection pool) serves all
/// attempts of this call.
pub fn fetch(url: &str, query: &[(&str, &str)], options: &FetchOptions) -> Result<RawResponse> {
    options.validate()?;
    let policy = RetryPolicy::transport(options.tries, options.backoff_factor)?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(options.timeout)
        .build()
        .map_err(GeolocateError::Network)?;

    run_with_retry(&policy, GeolocateError::is_transient, || {
        fetch_once(&client, url, query, options.timeout)
    })
}

fn fetch_once(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<RawResponse> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| classify(e, url, timeout))?;

    let status = response.status();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GeolocateError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let headers = response.headers().clone();
    let body = response.text().map_err(|e| classify(e, url, timeout))?;

    Ok(RawResponse {
        url: url.to_string(),
        status: status.as_u16(),
        headers,
        body,
    })
}

fn classify(e: reqwest::Error, url: &str, timeout: Duration) -> GeolocateError {
    if e.is_timeout() {
        GeolocateError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        GeolocateError::Network(e)
    }
}
