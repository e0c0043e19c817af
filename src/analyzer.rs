use crate::parser::LogRecord;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Threshold passed to [`suspicious_by_source`] by the CLI
pub const DEFAULT_SUSPICIOUS_THRESHOLD: usize = 10;

const LOGIN_ENDPOINT: &str = "/login";
const UNAUTHORIZED_STATUS: &str = "401";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A source address and how many records it contributed to a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub address: String,
    pub count: usize,
}

/// The most accessed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: usize,
}

/// The three aggregate views of one run
#[derive(Debug)]
pub struct AnalysisReport {
    pub total_records: usize,
    pub requests_by_source: Vec<SourceCount>,
    /// `None` when no record was extracted
    pub top_endpoint: Option<EndpointCount>,
    pub suspicious_by_source: Vec<SourceCount>,
}

/// Run every aggregator once over `records`.
pub fn analyze(records: &[LogRecord], threshold: usize) -> AnalysisReport {
    AnalysisReport {
        total_records: records.len(),
        requests_by_source: requests_by_source(records),
        top_endpoint: top_endpoint(records),
        suspicious_by_source: suspicious_by_source(records, threshold),
    }
}

/// Request count per source address, highest first.
pub fn requests_by_source(records: &[LogRecord]) -> Vec<SourceCount> {
    rank_by_count(records.iter().map(|r| r.source_address.as_str()))
        .into_iter()
        .map(|(address, count)| SourceCount {
            address: address.to_string(),
            count,
        })
        .collect()
}

/// The endpoint with the highest request count.
///
/// Returns `None` for an empty record set. On a tie the endpoint seen first
/// in the input wins.
pub fn top_endpoint(records: &[LogRecord]) -> Option<EndpointCount> {
    let counts = count_first_seen(records.iter().map(|r| r.endpoint.as_str()));

    let mut best: Option<(&str, usize)> = None;
    for (endpoint, count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((endpoint, count)),
        }
    }

    best.map(|(endpoint, count)| EndpointCount {
        endpoint: endpoint.to_string(),
        count,
    })
}

/// Failed login attempts per source address, highest first.
///
/// A record counts when it hits `/login` and either carries status 401 or an
/// error detail mentioning invalid credentials.
///
/// `threshold` is accepted for interface compatibility but does not filter
/// the result: every source with at least one failed login is returned.
pub fn suspicious_by_source(records: &[LogRecord], threshold: usize) -> Vec<SourceCount> {
    let hits = records
        .iter()
        .filter(|r| is_failed_login(r))
        .map(|r| r.source_address.as_str());

    let ranked: Vec<SourceCount> = rank_by_count(hits)
        .into_iter()
        .map(|(address, count)| SourceCount {
            address: address.to_string(),
            count,
        })
        .collect();

    debug!(
        threshold,
        sources = ranked.len(),
        "suspicious activity aggregated (threshold not applied)"
    );
    ranked
}

fn is_failed_login(record: &LogRecord) -> bool {
    record.endpoint == LOGIN_ENDPOINT
        && (record.status_code == UNAUTHORIZED_STATUS
            || record.error_detail.contains(INVALID_CREDENTIALS))
}

/// Count occurrences, keeping keys in first-seen order.
fn count_first_seen<'a, I>(keys: I) -> Vec<(&'a str, usize)>
where
    I: Iterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// Count occurrences and order by count descending; equal counts stay in
/// first-seen order.
fn rank_by_count<'a, I>(keys: I) -> Vec<(&'a str, usize)>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts = count_first_seen(keys);
    // stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log_line;

    fn make_record(ip: &str, endpoint: &str, status: &str, detail: &str) -> LogRecord {
        LogRecord {
            source_address: ip.to_string(),
            endpoint: endpoint.to_string(),
            status_code: status.to_string(),
            error_detail: detail.to_string(),
        }
    }

    fn sample_records() -> Vec<LogRecord> {
        vec![
            make_record("10.0.0.1", "/home", "200", ""),
            make_record("10.0.0.2", "/login", "401", "Invalid credentials"),
            make_record("10.0.0.1", "/about", "200", ""),
            make_record("10.0.0.3", "/login", "200", ""),
            make_record("10.0.0.2", "/login", "401", ""),
            make_record("10.0.0.1", "/home", "200", ""),
            make_record("10.0.0.3", "/login", "500", "Invalid credentials supplied"),
        ]
    }

    #[test]
    fn requests_sorted_by_count() {
        let ranked = requests_by_source(&sample_records());
        assert_eq!(ranked[0], SourceCount { address: "10.0.0.1".into(), count: 3 });
        assert_eq!(ranked[1], SourceCount { address: "10.0.0.2".into(), count: 2 });
        assert_eq!(ranked[2], SourceCount { address: "10.0.0.3".into(), count: 2 });
    }

    #[test]
    fn request_counts_sum_to_record_count() {
        let records = sample_records();
        let total: usize = requests_by_source(&records).iter().map(|s| s.count).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let records = vec![
            make_record("3.3.3.3", "/", "200", ""),
            make_record("1.1.1.1", "/", "200", ""),
            make_record("2.2.2.2", "/", "200", ""),
            make_record("1.1.1.1", "/", "200", ""),
            make_record("3.3.3.3", "/", "200", ""),
        ];
        let order: Vec<String> = requests_by_source(&records)
            .into_iter()
            .map(|s| s.address)
            .collect();
        assert_eq!(order, vec!["3.3.3.3", "1.1.1.1", "2.2.2.2"]);
        // repeated runs agree
        assert_eq!(requests_by_source(&records), requests_by_source(&records));
    }

    #[test]
    fn top_endpoint_has_maximum_count() {
        let records = sample_records();
        let top = top_endpoint(&records).unwrap();
        assert_eq!(top, EndpointCount { endpoint: "/login".into(), count: 4 });

        for (_, count) in count_first_seen(records.iter().map(|r| r.endpoint.as_str())) {
            assert!(top.count >= count);
        }
    }

    #[test]
    fn top_endpoint_tie_goes_to_first_seen() {
        let records = vec![
            make_record("1.1.1.1", "/b", "200", ""),
            make_record("1.1.1.1", "/a", "200", ""),
            make_record("1.1.1.1", "/a", "200", ""),
            make_record("1.1.1.1", "/b", "200", ""),
        ];
        assert_eq!(top_endpoint(&records).unwrap().endpoint, "/b");
    }

    #[test]
    fn top_endpoint_of_empty_input_is_none() {
        assert!(top_endpoint(&[]).is_none());
    }

    #[test]
    fn detects_failed_logins() {
        let suspicious = suspicious_by_source(&sample_records(), DEFAULT_SUSPICIOUS_THRESHOLD);
        assert_eq!(
            suspicious,
            vec![
                SourceCount { address: "10.0.0.2".into(), count: 2 },
                SourceCount { address: "10.0.0.3".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn failed_login_requires_login_endpoint() {
        let records = vec![
            make_record("1.1.1.1", "/admin", "401", "Invalid credentials"),
            make_record("1.1.1.1", "/login/", "401", ""),
        ];
        assert!(suspicious_by_source(&records, 0).is_empty());
    }

    #[test]
    fn threshold_does_not_filter() {
        let records = sample_records();
        assert_eq!(
            suspicious_by_source(&records, 1000),
            suspicious_by_source(&records, 0)
        );
        assert_eq!(suspicious_by_source(&records, 1000).len(), 2);
    }

    #[test]
    fn example_line_counts_in_requests_and_suspicious() {
        let record = parse_log_line(
            r#"192.168.1.5 - - [10/Oct/2023] "GET /login HTTP/1.1" 401 "Invalid credentials""#,
        )
        .unwrap();
        let records = vec![record];

        let requests = requests_by_source(&records);
        let suspicious = suspicious_by_source(&records, DEFAULT_SUSPICIOUS_THRESHOLD);
        assert_eq!(requests, vec![SourceCount { address: "192.168.1.5".into(), count: 1 }]);
        assert_eq!(suspicious, requests);
    }

    #[test]
    fn empty_records_produce_empty_report() {
        let report = analyze(&[], DEFAULT_SUSPICIOUS_THRESHOLD);
        assert_eq!(report.total_records, 0);
        assert!(report.requests_by_source.is_empty());
        assert!(report.top_endpoint.is_none());
        assert!(report.suspicious_by_source.is_empty());
    }
}
