//! Logging setup for the command-line tool: stderr only, stdout is for results.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,geolocate=info";
const VERBOSE_FILTER: &str = "info,geolocate=debug";

/// Install a fmt subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between the quiet and
/// the debug filter. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
