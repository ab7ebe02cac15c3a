//! CLI entry point for the citation rater tool.
//!
//! Loads the daily vehicle-miles-traveled dataset, scans a directory of
//! district-court citation exports for speeding charges, and renders the
//! miles-driven-per-citation charts.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use citation_rater::citations::{self, CitationDeltas};
use citation_rater::render::{ChartRenderer, SvgChart};
use citation_rater::report::{self, ReportConfig, RunSummary};
use citation_rater::traffic::{self, DEFAULT_TRAFFIC_DATA_PATH};
use citation_rater::violation::ViolationExtractor;

const METRIC_CHART_PATH: &str = "miles_driven_vs_tickets_order_by_data.svg";
const LOCALITY_CHART_PATH: &str = "miles_driven_vs_tickets_order_by_locality.svg";

#[derive(Parser)]
#[command(name = "citation_rater")]
#[command(
    about = "Correlates vehicle-miles-traveled with court speeding citations",
    long_about = None
)]
struct Cli {
    /// Directory containing district-court citation CSV exports
    #[arg(value_name = "CITATION_DIR")]
    citation_dir: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/citation_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("citation_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let traffic_path = std::env::var("TRAFFIC_DATA_PATH")
        .unwrap_or_else(|_| DEFAULT_TRAFFIC_DATA_PATH.to_string());
    let courts = traffic::load_traffic_data(Path::new(&traffic_path))?;

    let extractor = ViolationExtractor::new()?;
    let CitationDeltas { per_court, stats } =
        citations::scan_citations(&cli.citation_dir, &extractor, &courts)?;
    let courts = citations::apply_deltas(courts, per_court);

    let config = ReportConfig::default();
    let entries = report::build_entries(&courts, &config);
    let by_metric = report::order_by_metric(&entries);
    let by_locality = report::order_by_label(&entries, &config);

    let chart = SvgChart::default();
    chart.render(&by_metric, Path::new(METRIC_CHART_PATH))?;
    chart.render(&by_locality, Path::new(LOCALITY_CHART_PATH))?;

    let summary = RunSummary {
        generated_at: chrono::Utc::now(),
        scan: stats,
        by_metric,
        by_locality,
    };
    debug!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
