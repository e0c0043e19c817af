use crate::analyzer::{AnalysisReport, SourceCount};
use crate::error::{AnalyzerError, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const REQUESTS_TITLE: &str = "--- Requests per IP Address ---";
const ENDPOINT_TITLE: &str = "--- Most Frequently Accessed Endpoint ---";
const SUSPICIOUS_TITLE: &str = "--- Suspicious Activity Detected ---";

const ADDRESS_WIDTH: usize = 20;

/// Render the three report sections, in fixed order, to `out`.
pub fn write_console_report<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    section_header(out, REQUESTS_TITLE)?;
    write_source_rows(out, &report.requests_by_source)?;

    section_header(out, ENDPOINT_TITLE)?;
    match &report.top_endpoint {
        Some(top) => writeln!(out, "{} (Accessed {} times)", top.endpoint.cyan(), top.count)?,
        None => writeln!(out, "{}", "No endpoint data (no records parsed)".dimmed())?,
    }

    section_header(out, SUSPICIOUS_TITLE)?;
    write_source_rows(out, &report.suspicious_by_source)?;
    out.flush()
}

/// Write the CSV report to `path`, replacing any existing file.
pub fn save_csv(report: &AnalysisReport, path: &Path) -> Result<()> {
    let csv_err = |source: csv::Error| AnalyzerError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| csv_err(e.into()))?;
    write_csv(file, report).map_err(csv_err)
}

/// Write the three CSV sections: a title row, a column header row and the
/// data rows each, separated by blank rows.
pub fn write_csv<W: Write>(mut out: W, report: &AnalysisReport) -> std::result::Result<(), csv::Error> {
    write_csv_section(
        &mut out,
        REQUESTS_TITLE,
        ["IP Address", "Request Count"],
        &report.requests_by_source,
    )?;
    out.write_all(b"\r\n")?;

    write_csv_section(
        &mut out,
        ENDPOINT_TITLE,
        ["Endpoint", "Access Count"],
        report.top_endpoint.as_slice(),
    )?;
    out.write_all(b"\r\n")?;

    write_csv_section(
        &mut out,
        SUSPICIOUS_TITLE,
        ["IP Address", "Failed Login Count"],
        &report.suspicious_by_source,
    )?;
    out.flush()?;
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// One titled section. The csv writer only lives for the section: a blank
/// separator row can't be expressed as a record, so it goes to `out` directly.
fn write_csv_section<W: Write, R: Serialize>(
    out: &mut W,
    title: &str,
    columns: [&str; 2],
    rows: &[R],
) -> std::result::Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);

    wtr.write_record([title])?;
    wtr.write_record(columns)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn section_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title.white().bold())
}

fn write_source_rows<W: Write>(out: &mut W, rows: &[SourceCount]) -> io::Result<()> {
    for item in rows {
        let address = format!("{:<width$}", item.address, width = ADDRESS_WIDTH);
        writeln!(out, "{} {}", address.cyan(), item.count)?;
    }
    Ok(())
}
