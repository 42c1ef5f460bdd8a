//! Resolve many addresses on a pool of worker threads.
//!
//! Workers pull the next unclaimed index from a shared counter and send
//! `(index, result)` back over a channel; results are slotted by index, so
//! the output follows input order whatever order the workers finish in.

use indicatif::{ProgressBar, ProgressStyle};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::api::FetchOptions;
use crate::domain::Coordinate;
use crate::engine::Engine;
use crate::error::{GeolocateError, Result};
use crate::outcome::{OutcomePolicy, resolve_with_outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; `None` means one per available core.
    pub workers: Option<usize>,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: None,
            progress: false,
        }
    }
}

impl BatchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(GeolocateError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

/// Resolve every address, returning one coordinate per address in input order.
///
/// Per-address failures are handled by `policy`. When the policy raises, the
/// first error received is returned; workers stop taking new addresses but
/// in-flight lookups run to completion.
pub fn resolve_batch<E, S>(
    engine: &E,
    addresses: &[S],
    fetch: &FetchOptions,
    policy: &OutcomePolicy,
    options: &BatchOptions,
) -> Result<Vec<Coordinate>>
where
    E: Engine + ?Sized,
    S: AsRef<str> + Sync,
{
    options.validate()?;
    fetch.validate()?;
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    let workers = options.worker_count().min(addresses.len());
    tracing::debug!(
        "{}: resolving {} addresses on {} workers",
        engine.name(),
        addresses.len(),
        workers
    );

    let progress = if options.progress {
        create_progress_bar(addresses.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let next = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let (next, abort, progress) = (&next, &abort, &progress);
            scope.spawn(move || {
                while !abort.load(Ordering::Relaxed) {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(address) = addresses.get(index) else {
                        break;
                    };
                    let result = resolve_with_outcome(engine, address.as_ref(), fetch, policy);
                    if result.is_err() {
                        abort.store(true, Ordering::Relaxed);
                    }
                    progress.inc(1);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);
    progress.finish_and_clear();

    let mut slots: Vec<Option<Coordinate>> = vec![None; addresses.len()];
    for (index, result) in rx {
        slots[index] = Some(result?);
    }

    // Without an error every index was claimed and answered
    Ok(slots.into_iter().flatten().collect())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})";
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
