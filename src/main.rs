use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use geolocate::config::FileConfig;
use geolocate::logging::init_logging;
use geolocate::{EngineKind, GeolocateOptions, geolocate, geolocate_batch};

/// Geolocate addresses through public mapping endpoints
///
/// Examples:
///   # One address, printed as a JSON object
///   geolocate "1 Infinite Loop, Cupertino, CA 95014"
///
///   # Many addresses from a file, printed as a JSON array in input order
///   geolocate --input addresses.txt --workers 8
///
///   # Use Google Maps and fail loudly on unknown addresses
///   geolocate -e google-maps --on-not-found raise "Eiffel Tower"
#[derive(Parser, Debug)]
#[command(name = "geolocate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Addresses to geolocate
    addresses: Vec<String>,

    /// Read addresses from a file, one per line ("-" for stdin)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Engine: waze or google-maps
    #[arg(short = 'e', long)]
    engine: Option<EngineKind>,

    /// Per-request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<f64>,

    /// Attempts per request, including the first
    #[arg(long)]
    tries: Option<u32>,

    /// Seconds before the first retry; doubles on each further retry
    #[arg(long)]
    backoff_factor: Option<f64>,

    /// What to do with addresses that are not found: ignore or raise
    #[arg(long)]
    on_not_found: Option<String>,

    /// What to do when a lookup fails: ignore or raise
    #[arg(long)]
    on_error: Option<String>,

    /// Worker threads for batches (defaults to the number of cores)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Hide the batch progress bar
    #[arg(long)]
    no_progress: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Path to config file (optional, auto-searches geolocate.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        FileConfig::from_path(config_path)
            .context(format!("Failed to load config file: {:?}", config_path))?
    } else {
        FileConfig::load().unwrap_or_default()
    };
    apply_overrides(&mut config, &args);

    let options = GeolocateOptions {
        fetch: config.fetch_options().context("Invalid request settings")?,
        outcome: config.outcome_policy().context("Invalid outcome policy")?,
    };
    let batch = config.batch_options().context("Invalid batch settings")?;
    let engine = config.engine();

    let mut addresses = args.addresses.clone();
    if let Some(ref input) = args.input {
        addresses.extend(read_addresses(input)?);
    }
    if addresses.is_empty() {
        bail!("No addresses given. Pass them as arguments or with --input");
    }

    let start = Instant::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let [address] = addresses.as_slice() {
        let coordinate = geolocate(address, Some(engine.as_ref()), &options)
            .context(format!("Failed to geolocate {:?}", address))?;
        write_json(&mut out, &coordinate, args.pretty)?;
    } else {
        let coordinates = geolocate_batch(&addresses, Some(engine.as_ref()), &options, &batch)
            .context("Batch geolocation failed")?;
        let missing = coordinates.iter().filter(|c| c.is_null()).count();
        tracing::info!(
            "geolocated {} addresses ({} without result) in {:.1}s",
            coordinates.len(),
            missing,
            start.elapsed().as_secs_f32()
        );
        write_json(&mut out, &coordinates, args.pretty)?;
    }

    Ok(())
}

/// Command-line values take precedence over the config file.
fn apply_overrides(config: &mut FileConfig, args: &Args) {
    if let Some(engine) = args.engine {
        config.engine = engine;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(tries) = args.tries {
        config.tries = tries;
    }
    if let Some(backoff_factor) = args.backoff_factor {
        config.backoff_factor = backoff_factor;
    }
    if let Some(ref action) = args.on_not_found {
        config.on_not_found = action.clone();
    }
    if let Some(ref action) = args.on_error {
        config.on_error = action.clone();
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if args.no_progress {
        config.progress = false;
    }
}

fn read_addresses(path: &Path) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = std::fs::File::open(path)
            .context(format!("Failed to open address file: {:?}", path))?;
        Box::new(BufReader::new(file))
    };

    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read address list")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            addresses.push(trimmed.to_string());
        }
    }
    Ok(addresses)
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
