//! CLI entry point for the air-quality nowcast helpers.
//!
//! Provides subcommands for generating synthetic observation tables,
//! converting PM2.5 to AQI, fusing observations into a nowcast, and running
//! feature engineering over a merged CSV.

use anyhow::Result;
use aq_nowcast::aqi::{AqiCategory, epa_aqi_pm25};
use aq_nowcast::features::{feature_engineer, parse_timestamp};
use aq_nowcast::fusion::{DEFAULT_OBS_VARIANCE, FusionState};
use aq_nowcast::loaders::{
    BoundingBox, DEFAULT_COLUMN_VAR, ObservationSource, Pollutant, SyntheticSource, SystemClock,
};
use aq_nowcast::output::{
    append_record, print_json, print_pretty, read_table, write_records, write_table,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aq_nowcast")]
#[command(about = "Air-quality nowcast helpers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Spatial and temporal window shared by the loader subcommands.
#[derive(Args, Debug)]
struct Window {
    #[arg(long, default_value_t = -122.6, allow_hyphen_values = true)]
    minx: f64,
    #[arg(long, default_value_t = 47.1, allow_hyphen_values = true)]
    miny: f64,
    #[arg(long, default_value_t = -122.0, allow_hyphen_values = true)]
    maxx: f64,
    #[arg(long, default_value_t = 47.8, allow_hyphen_values = true)]
    maxy: f64,

    /// Window start (RFC 3339, inclusive)
    #[arg(long, value_parser = parse_timestamp)]
    start: DateTime<Utc>,

    /// Window end (RFC 3339, exclusive)
    #[arg(long, value_parser = parse_timestamp)]
    end: DateTime<Utc>,

    /// Seed for reproducible output; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// CSV file to write rows to
    #[arg(short, long)]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic ground-station observations
    Ground {
        #[command(flatten)]
        window: Window,

        /// Pollutant to report (PM25, O3, NO2)
        #[arg(short, long, default_value = "PM25")]
        pollutant: Pollutant,
    },
    /// Generate synthetic satellite column retrievals
    Columns {
        #[command(flatten)]
        window: Window,

        /// Column variable name
        #[arg(long, default_value = DEFAULT_COLUMN_VAR)]
        var: String,
    },
    /// Generate synthetic weather-model fields
    Weather {
        #[command(flatten)]
        window: Window,
    },
    /// Convert a PM2.5 concentration (ug/m3) to AQI
    Aqi {
        #[arg(value_name = "UGM3", allow_hyphen_values = true)]
        ugm3: f64,
    },
    /// Fuse a sequence of observations into a prior nowcast
    Fuse {
        #[arg(long, allow_hyphen_values = true)]
        prior_mean: f64,

        #[arg(long)]
        prior_var: f64,

        /// Variance applied to every observation
        #[arg(long, default_value_t = DEFAULT_OBS_VARIANCE)]
        obs_var: f64,

        /// CSV file to append each updated state to
        #[arg(long)]
        append: Option<String>,

        /// Observations, applied in order
        #[arg(value_name = "OBS", required = true, allow_hyphen_values = true)]
        observations: Vec<f64>,
    },
    /// Derive calendar and normalized features from a merged CSV
    Features {
        /// Merged CSV with a `ts` column
        #[arg(short, long)]
        input: String,

        /// CSV file to write features to
        #[arg(short, long)]
        output: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aq_nowcast.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aq_nowcast.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ground { window, pollutant } => {
            let (bbox, mut source) = open_window(&window)?;
            let rows = source.ground_observations(&bbox, window.start, window.end, pollutant)?;
            write_records(&window.output, &rows)?;
        }
        Commands::Columns { window, var } => {
            let (bbox, mut source) = open_window(&window)?;
            let rows = source.satellite_columns(&bbox, window.start, window.end, &var)?;
            write_records(&window.output, &rows)?;
        }
        Commands::Weather { window } => {
            let (bbox, mut source) = open_window(&window)?;
            let rows = source.weather(&bbox, window.start, window.end)?;
            write_records(&window.output, &rows)?;
        }
        Commands::Aqi { ugm3 } => {
            let aqi = epa_aqi_pm25(ugm3);
            let category = AqiCategory::from_aqi(aqi);
            info!(
                ugm3,
                aqi,
                category = category.label(),
                color = category.color(),
                "AQI"
            );
        }
        Commands::Fuse {
            prior_mean,
            prior_var,
            obs_var,
            append,
            observations,
        } => {
            let prior = FusionState::new(prior_mean, prior_var);
            let state = fuse_all(prior, &observations, obs_var, append.as_deref())?;
            print_json(&state)?;
        }
        Commands::Features { input, output } => {
            run_features(&input, &output)?;
        }
    }

    Ok(())
}

/// Validates the bounding box and builds a synthetic source for the window.
fn open_window(window: &Window) -> Result<(BoundingBox, SyntheticSource<StdRng, SystemClock>)> {
    let bbox = BoundingBox::new(window.minx, window.miny, window.maxx, window.maxy)?;
    let rng = match window.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        start = %window.start,
        end = %window.end,
        seed = ?window.seed,
        output = %window.output,
        "Generating synthetic rows"
    );
    Ok((bbox, SyntheticSource::new(rng, SystemClock)))
}

/// Applies each observation in turn, logging the intermediate states and
/// appending them to `append` when given.
#[tracing::instrument(skip(observations), fields(count = observations.len()))]
fn fuse_all(
    prior: FusionState,
    observations: &[f64],
    obs_var: f64,
    append: Option<&str>,
) -> Result<FusionState> {
    let mut state = prior;
    for (step, obs) in observations.iter().enumerate() {
        state.update(*obs, obs_var)?;
        debug!(step, obs, mean = state.mean, variance = state.variance, "Nowcast updated");
        if let Some(path) = append {
            append_record(path, &state)?;
        }
    }
    print_pretty(&state);
    Ok(state)
}

#[tracing::instrument]
fn run_features(input: &str, output: &str) -> Result<()> {
    let merged = read_table(input)?;
    let features = feature_engineer(&merged)?;
    write_table(output, &features)?;
    info!(rows = features.n_rows(), cols = features.n_cols(), "Features written");
    Ok(())
}
