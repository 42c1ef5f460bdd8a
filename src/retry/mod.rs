//! Retry with exponential backoff.
//!
//! Generic over the operation and its error type; callers decide which
//! errors are worth another attempt.

mod policy;
mod run;

pub use policy::{MAX_DELAY, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_sleeping};
