use crate::error::{AnalyzerError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Endpoint recorded when the request line has no path token
pub const UNKNOWN_ENDPOINT: &str = "Unknown";

/// Represents a single extracted access log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub source_address: String,
    pub endpoint: String,
    pub status_code: String,
    pub error_detail: String,
}

/// Records pulled out of one input, in input order
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<LogRecord>,
    /// Lines that did not match and were dropped
    pub skipped: usize,
}

impl Extraction {
    fn push_line(&mut self, line_num: usize, line: &str) {
        match parse_log_line(line) {
            Some(record) => self.records.push(record),
            None => {
                self.skipped += 1;
                debug!(line = line_num, "skipping unmatched log line");
            }
        }
    }
}

/// Expected shape (quasi Apache combined):
///   ADDRESS ... "REQUEST LINE" ... STATUS ["ERROR DETAIL"]
///
/// Example:
///   192.168.1.5 - - [10/Oct/2023] "GET /login HTTP/1.1" 401 "Invalid credentials"
///
/// The search is unanchored and every gap between anchors is lazy, so long
/// lines cannot drag the request or status capture past the real fields.
/// Lines reach the regex without their terminator, hence `$` next to `\s`
/// after the status.
static LOG_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_regex() -> &'static Regex {
    LOG_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?P<source>[\d.]+).*?"(?P<request>.*?)".*?(?P<status>\d{3})(?:\s|$).*?(?P<detail>".*?")?"#,
        )
        .expect("hard-coded regex should always compile")
    })
}

/// Extract a `LogRecord` from one line, or `None` if the line does not match.
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let caps = get_regex().captures(line)?;

    let endpoint = caps["request"]
        .split_whitespace()
        .nth(1)
        .unwrap_or(UNKNOWN_ENDPOINT)
        .to_string();

    let error_detail = caps
        .name("detail")
        .map(|m| m.as_str().trim_matches('"').to_string())
        .unwrap_or_default();

    Some(LogRecord {
        source_address: caps["source"].to_string(),
        endpoint,
        status_code: caps["status"].to_string(),
        error_detail,
    })
}

/// Read and extract every line of the log file at `path`.
///
/// A missing or unreadable file is fatal. Lines that are not valid UTF-8 are
/// dropped like any other unmatched line.
pub fn read_log_file(path: &Path) -> Result<Extraction> {
    let file = File::open(path).map_err(|source| AnalyzerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut extraction = Extraction::default();
    for (idx, line_result) in BufReader::new(file).lines().enumerate() {
        let line_num = idx + 1;
        match line_result {
            Ok(line) => extraction.push_line(line_num, &line),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                extraction.skipped += 1;
                debug!(line = line_num, "skipping non UTF-8 log line");
            }
            Err(source) => {
                return Err(AnalyzerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    info!(
        path = %path.display(),
        records = extraction.records.len(),
        skipped = extraction.skipped,
        "log file extracted"
    );
    Ok(extraction)
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────
