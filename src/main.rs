mod analyzer;
mod error;
mod logging;
mod parser;
mod report;

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Fixed name of the CSV artifact, written to the working directory
const CSV_OUTPUT: &str = "log_analysis_results.csv";

/// Summarizes web server access logs into a console report and a CSV file
#[derive(Parser, Debug)]
#[command(
    name = "access_log_analyzer",
    author,
    version,
    about = "Counts requests per source, finds the busiest endpoint and flags failed logins"
)]
struct Args {
    /// Path to the access log to analyze
    #[arg(value_name = "LOG_FILE", default_value = "sample.log")]
    file: PathBuf,
}

fn main() {
    let args = Args::parse();
    logging::init_logging();

    let stdout = io::stdout();
    if let Err(e) = run(&args.file, Path::new(CSV_OUTPUT), &mut stdout.lock()) {
        error!(error = %e, "analysis failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Parse `log_path`, print the report to `console` and write the CSV to
/// `csv_path`. The CSV is written even when the console write fails.
fn run<W: Write>(log_path: &Path, csv_path: &Path, console: &mut W) -> error::Result<()> {
    let extraction = parser::read_log_file(log_path)?;
    let report = analyzer::analyze(&extraction.records, analyzer::DEFAULT_SUSPICIOUS_THRESHOLD);
    info!(records = report.total_records, "analysis complete");

    let printed = report::write_console_report(console, &report);

    report::save_csv(&report, csv_path)?;
    info!(path = %csv_path.display(), "CSV report written");

    printed.map_err(error::AnalyzerError::Console)
}
