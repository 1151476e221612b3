//! CLI entry point for the bike-share exploratory analysis.
//!
//! Generates the synthetic trip table, exports it, aggregates it and prints
//! the narrative report. Running without a subcommand does all of that with
//! the default parameters.

use anyhow::Result;
use bike_share_eda::analyzers::Analysis;
use bike_share_eda::config::GeneratorConfig;
use bike_share_eda::generator::generate;
use bike_share_eda::model::TripRecord;
use bike_share_eda::output::{read_trips, write_summary_json, write_trips};
use bike_share_eda::report::Report;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bike_share_eda")]
#[command(about = "Exploratory analysis of a simulated bike-share dataset", long_about = None)]
struct Cli {
    /// JSON file with generator parameters; omitted fields keep their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// Override the random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Override the number of trips to generate
    #[arg(long, global = true)]
    records: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, export, aggregate and print the report (default)
    Run(RunArgs),
    /// Generate the trip table and export it to CSV only
    Generate {
        /// CSV file to write the trips to
        #[arg(short, long, default_value = "bike_share_data.csv")]
        output: String,

        /// Omit the UTF-8 byte order mark
        #[arg(long, default_value_t = false)]
        no_bom: bool,
    },
    /// Aggregate a previously exported CSV and print the report
    Analyze {
        /// CSV file produced by `generate` or `run`
        #[arg(short, long, default_value = "bike_share_data.csv")]
        input: String,

        /// Optional JSON file for the aggregate tables
        #[arg(short, long)]
        summary: Option<String>,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// CSV file to write the trips to
    #[arg(short, long, default_value = "bike_share_data.csv")]
    output: String,

    /// Optional JSON file for the aggregate tables
    #[arg(short, long)]
    summary: Option<String>,

    /// Skip the CSV export
    #[arg(long, default_value_t = false)]
    no_export: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bike_share_eda.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bike_share_eda.log"));

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
    let config = load_config(&cli)?;

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default_run())) {
        Commands::Run(args) => run(&config, &args)?,
        Commands::Generate { output, no_bom } => {
            let trips = generate(&config)?;
            write_trips(&output, &trips, !no_bom)?;
        }
        Commands::Analyze { input, summary } => {
            let trips = read_trips(&input)?;
            report(&trips, summary.as_deref())?;
        }
    }

    Ok(())
}

impl RunArgs {
    /// Arguments used when no subcommand is given.
    fn default_run() -> Self {
        RunArgs {
            output: "bike_share_data.csv".to_string(),
            ..Default::default()
        }
    }
}

/// Builds the generator config from the optional file plus CLI overrides,
/// rejecting invalid parameters before any work starts.
fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(records) = cli.records {
        config.record_count = records;
    }

    config.validate()?;
    info!(
        records = config.record_count,
        seed = config.seed,
        start = %config.start_date,
        end = %config.end_date,
        "Configuration loaded"
    );
    Ok(config)
}

#[tracing::instrument(skip_all, fields(output = %args.output, no_export = args.no_export))]
fn run(config: &GeneratorConfig, args: &RunArgs) -> Result<()> {
    let trips = generate(config)?;

    if !args.no_export {
        if let Err(e) = write_trips(&args.output, &trips, true) {
            error!(error = %e, "Trip export failed");
            return Err(e);
        }
    }

    report(&trips, args.summary.as_deref())
}

/// Aggregates `trips`, prints the report to stdout and optionally writes the
/// JSON summary.
fn report(trips: &[TripRecord], summary: Option<&str>) -> Result<()> {
    let analysis = Analysis::from_trips(trips);

    println!("{}", Report::new(&analysis));

    if let Some(path) = summary {
        write_summary_json(path, &analysis)?;
    }
    info!("Analysis finished");
    Ok(())
}
