//! Window-filtered usage aggregation and spend estimation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{CostError, Result};
use crate::models::{CostReport, ModelCost, UsageTotals};
use crate::parser::{TIMESTAMP_FORMAT, parse_line_within};
use crate::pricing::PriceTable;

/// Outcome of a spend calculation.
#[derive(Debug, Clone)]
pub enum Spend {
    /// At least one record fell inside the window
    Report(CostReport),

    /// The log was readable but no records matched the window
    NoData {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Reads the usage log and prices token totals over a date window.
///
/// Each run re-reads the whole log in one linear scan; there is no index
/// and no cached state between runs. The scan never fails on log content:
/// malformed lines are skipped with a `warn!` diagnostic. Only a missing
/// or unreadable file escalates as an error.
pub struct Aggregator {
    log_path: PathBuf,
    prices: PriceTable,
}

impl Aggregator {
    /// Create an aggregator over the log at `path` with default pricing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            log_path: path.as_ref().to_path_buf(),
            prices: PriceTable::new(),
        }
    }

    /// Create an aggregator with a custom price table.
    pub fn with_prices(path: impl AsRef<Path>, prices: PriceTable) -> Self {
        Self {
            log_path: path.as_ref().to_path_buf(),
            prices,
        }
    }

    /// Sum in-window token usage per model and derive costs.
    ///
    /// `start` defaults to 30 days before now, `end` to now; both bounds
    /// are inclusive. Returns [`Spend::NoData`] when nothing matched, and
    /// [`CostError::LogNotFound`] when the log file does not exist.
    pub fn calculate_spent(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Spend> {
        let now = Local::now().naive_local();
        let start = start.unwrap_or(now - Duration::days(30));
        let end = end.unwrap_or(now);

        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CostError::LogNotFound {
                    path: self.log_path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);

        let mut totals = UsageTotals::new();
        let mut skipped = 0usize;
        let mut line_number = 0usize;

        for line in reader.lines() {
            line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_number, error = %e, "failed to read usage log line");
                    skipped += 1;
                    continue;
                }
            };

            match parse_line_within(&line, Some((start, end))) {
                Ok(Some(record)) => totals.add(&record.model, record.tokens),
                Ok(None) => {}
                Err(e) => {
                    warn!(line = line_number, raw = %line, error = %e, "skipping malformed usage line");
                    skipped += 1;
                }
            }
        }

        debug!(
            models = totals.len(),
            skipped,
            start = %start,
            end = %end,
            "usage log scan complete"
        );

        if totals.is_empty() {
            return Ok(Spend::NoData { start, end });
        }

        let mut lines = Vec::with_capacity(totals.len());
        let mut total_cost_usd = 0.0;
        for (model, tokens) in totals.iter() {
            let cost_usd = self.prices.cost(model, tokens);
            total_cost_usd += cost_usd;
            lines.push(ModelCost {
                model: model.to_string(),
                tokens,
                cost_usd,
            });
        }

        Ok(Spend::Report(CostReport {
            start,
            end,
            lines,
            total_cost_usd,
            skipped_lines: skipped,
        }))
    }
}

/// Parse a lower window bound from the command line.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`, which resolves to
/// the start of that day.
pub fn parse_start_bound(input: &str) -> Result<NaiveDateTime> {
    parse_bound(input, false)
}

/// Parse an upper window bound from the command line.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`, which resolves to
/// the end of that day so a date-only bound covers the whole day.
pub fn parse_end_bound(input: &str) -> Result<NaiveDateTime> {
    parse_bound(input, true)
}

fn parse_bound(input: &str, end_of_day: bool) -> Result<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        if let Some(dt) = time {
            return Ok(dt);
        }
    }
    Err(CostError::InvalidDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn write_log(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.log");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_log_is_log_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let aggregator = Aggregator::new(dir.path().join("token_usage.log"));
        let err = aggregator.calculate_spent(None, None).unwrap_err();
        assert!(matches!(err, CostError::LogNotFound { .. }));
    }

    #[test]
    fn test_empty_log_is_no_data() {
        let (_dir, path) = write_log("");
        let aggregator = Aggregator::new(&path);
        let spend = aggregator.calculate_spent(None, None).unwrap();
        assert!(matches!(spend, Spend::NoData { .. }));
    }

    #[test]
    fn test_default_window_includes_recent_usage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.log");
        let logger = crate::logger::UsageLogger::new(&path);
        logger.log_usage("gpt-4o", 100).unwrap();

        let aggregator = Aggregator::new(&path);
        match aggregator.calculate_spent(None, None).unwrap() {
            Spend::Report(report) => {
                assert_eq!(report.lines.len(), 1);
                assert_eq!(report.lines[0].tokens, 100);
            }
            Spend::NoData { .. } => panic!("recent usage should fall in the default window"),
        }
    }

    #[test]
    fn test_unpriced_model_listed_at_zero_cost() {
        let (_dir, path) = write_log(
            "[2024-06-01 10:00:00] Model: o1-preview | Tokens used: 5000\n",
        );
        let aggregator = Aggregator::new(&path);
        let spend = aggregator
            .calculate_spent(
                Some(ts("2024-01-01 00:00:00")),
                Some(ts("2024-12-31 23:59:59")),
            )
            .unwrap();

        match spend {
            Spend::Report(report) => {
                assert_eq!(report.lines.len(), 1);
                assert_eq!(report.lines[0].model, "o1-preview");
                assert_eq!(report.lines[0].tokens, 5000);
                assert_eq!(report.lines[0].cost_usd, 0.0);
                assert_eq!(report.total_cost_usd, 0.0);
            }
            Spend::NoData { .. } => panic!("unpriced model must still be reported"),
        }
    }

    #[test]
    fn test_malformed_lines_counted_not_fatal() {
        let (_dir, path) = write_log(
            "[2024-06-01 10:00:00] Model: gpt-4o | Tokens used: 100\n\
             [garbled] Model: gpt-4o | Tokens used: 100\n\
             [2024-06-01 11:00:00] Model: gpt-4o | Tokens used: oops\n\
             [2024-06-01 12:00:00] Model: gpt-4o | Tokens used: 50\n",
        );
        let aggregator = Aggregator::new(&path);
        let spend = aggregator
            .calculate_spent(
                Some(ts("2024-06-01 00:00:00")),
                Some(ts("2024-06-01 23:59:59")),
            )
            .unwrap();

        match spend {
            Spend::Report(report) => {
                assert_eq!(report.lines.len(), 1);
                assert_eq!(report.lines[0].tokens, 150);
                assert_eq!(report.skipped_lines, 2);
            }
            Spend::NoData { .. } => panic!("well-formed lines should survive"),
        }
    }

    #[test]
    fn test_parse_start_bound() {
        assert_eq!(
            parse_start_bound("2024-01-02").unwrap(),
            ts("2024-01-02 00:00:00")
        );
        assert_eq!(
            parse_start_bound("2024-01-02 10:30:00").unwrap(),
            ts("2024-01-02 10:30:00")
        );
    }

    #[test]
    fn test_parse_end_bound_covers_whole_day() {
        assert_eq!(
            parse_end_bound("2024-01-02").unwrap(),
            ts("2024-01-02 23:59:59")
        );
        assert_eq!(
            parse_end_bound("2024-01-02 10:30:00").unwrap(),
            ts("2024-01-02 10:30:00")
        );
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        assert!(matches!(
            parse_start_bound("yesterday"),
            Err(CostError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_end_bound("01/02/2024"),
            Err(CostError::InvalidDate { .. })
        ));
    }
}
