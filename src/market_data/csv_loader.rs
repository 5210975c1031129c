// =============================================================================
// CSV History Loader
// =============================================================================
//
// Reads a `time,open,high,low,close` CSV export into a `HistorySeries`. The
// first row is treated as a header. Rows that cannot become a valid bar are
// skipped with a warning instead of aborting the load:
//
//   - fewer than five fields
//   - unparseable timestamp or price
//   - non-positive or non-finite price
//   - timestamp not after the previous accepted row
//
// Accepted timestamp forms: integer epoch seconds, RFC 3339,
// `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD` (midnight UTC). Columns past
// the fifth are ignored so TradingView-style exports load as-is.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::market_data::{Bar, HistorySeries};

/// Load a history CSV from disk.
pub fn load_history(path: impl AsRef<Path>) -> Result<HistorySeries> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open history CSV {}", path.display()))?;

    let series = read_history(file)?;
    info!(path = %path.display(), bars = series.len(), "history CSV loaded");
    Ok(series)
}

/// Parse history CSV from any reader (tests feed in-memory bytes here).
pub fn read_history(reader: impl Read) -> Result<HistorySeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars: Vec<Bar> = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in csv_reader.records().enumerate() {
        let record = record.context("failed to read CSV record")?;
        match parse_row(&record, bars.last().map(|b| b.time)) {
            Ok(bar) => bars.push(bar),
            Err(reason) => {
                skipped += 1;
                // Header is line 1, so the first data record is line 2.
                warn!(line = index + 2, reason, "skipping malformed CSV row");
            }
        }
    }

    if skipped > 0 {
        info!(
            accepted = bars.len(),
            skipped, "history CSV parsed with skipped rows"
        );
    }
    Ok(HistorySeries::from_bars(bars))
}

/// Turn one CSV record into a bar, or name the reason it cannot be one.
fn parse_row(record: &csv::StringRecord, prev_time: Option<i64>) -> Result<Bar, &'static str> {
    if record.len() < 5 {
        return Err("fewer than five fields");
    }

    let time = parse_bar_time(&record[0]).ok_or("unparseable timestamp")?;
    let open = parse_price(&record[1])?;
    let high = parse_price(&record[2])?;
    let low = parse_price(&record[3])?;
    let close = parse_price(&record[4])?;

    if let Some(prev) = prev_time {
        if time <= prev {
            return Err("timestamp not after previous row");
        }
    }

    Ok(Bar {
        time,
        open,
        high,
        low,
        close,
    })
}

fn parse_price(field: &str) -> Result<f64, &'static str> {
    let value: f64 = field.parse().map_err(|_| "unparseable price")?;
    if !value.is_finite() || value <= 0.0 {
        return Err("non-positive or non-finite price");
    }
    Ok(value)
}

/// Parse a timestamp field into epoch seconds.
///
/// Tried in order: integer epoch seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// bare `YYYY-MM-DD` (midnight UTC).
fn parse_bar_time(field: &str) -> Option<i64> {
    if let Ok(epoch) = field.parse::<i64>() {
        return Some(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return Some(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().timestamp());
    }
    if let Ok(date) = NaiveDate::parse_from_str(field, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> HistorySeries {
        read_history(input.as_bytes()).unwrap()
    }

    #[test]
    fn loads_epoch_seconds_csv() {
        let series = read(
            "time,open,high,low,close\n\
             1700000000,100.0,101.0,99.0,100.5\n\
             1700086400,100.5,102.0,100.0,101.5\n\
             1700172800,101.5,103.0,101.0,102.0\n",
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[0].time, 1_700_000_000);
        assert!((series.bars()[0].close - 100.5).abs() < f64::EPSILON);
        assert!((series.bars().last().unwrap().high - 103.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_all_timestamp_forms() {
        let series = read(
            "time,open,high,low,close\n\
             1704067200,100,101,99,100\n\
             2024-01-02T00:00:00+00:00,100,101,99,100\n\
             2024-01-03 00:00:00,100,101,99,100\n\
             2024-01-04,100,101,99,100\n",
        );
        let times: Vec<i64> = series.bars().iter().map(|b| b.time).collect();
        assert_eq!(
            times,
            vec![1_704_067_200, 1_704_153_600, 1_704_240_000, 1_704_326_400]
        );
    }

    #[test]
    fn skips_short_and_unparseable_rows() {
        let series = read(
            "time,open,high,low,close\n\
             1700000000,100,101,99,100\n\
             1700086400,100,101\n\
             not-a-date,100,101,99,100\n\
             1700172800,abc,101,99,100\n\
             1700259200,100,101,99,100\n",
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[1].time, 1_700_259_200);
    }

    #[test]
    fn skips_non_positive_and_non_finite_prices() {
        let series = read(
            "time,open,high,low,close\n\
             1700000000,100,101,99,100\n\
             1700086400,0,101,99,100\n\
             1700172800,100,101,99,-5\n\
             1700259200,100,inf,99,100\n\
             1700345600,100,101,nan,100\n\
             1700432000,100,101,99,100\n",
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[1].time, 1_700_432_000);
    }

    #[test]
    fn skips_non_increasing_timestamps() {
        let series = read(
            "time,open,high,low,close\n\
             1700000000,100,101,99,100\n\
             1700000000,100,101,99,100\n\
             1699913600,100,101,99,100\n\
             1700086400,100,101,99,100\n",
        );
        assert_eq!(series.len(), 2);
        let times: Vec<i64> = series.bars().iter().map(|b| b.time).collect();
        assert_eq!(times, vec![1_700_000_000, 1_700_086_400]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let series = read(
            "time,open,high,low,close,volume\n\
             1700000000,100,101,99,100,12345\n",
        );
        assert_eq!(series.len(), 1);
        assert!((series.bars()[0].low - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn header_only_yields_empty_series() {
        let series = read("time,open,high,low,close\n");
        assert!(series.is_empty());
    }
}
