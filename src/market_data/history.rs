// =============================================================================
// OHLC Bars & History Series
// =============================================================================
//
// Core market data types. A `Bar` is one OHLC observation for a fixed time
// interval; a `HistorySeries` is the ordered sequence of bars (oldest first)
// that the classifier and simulator consume. Timestamp ordering is enforced
// at the ingestion boundary (csv_loader), not re-checked here.

use serde::{Deserialize, Serialize};

/// A single OHLC price bar.
///
/// `time` is seconds since the Unix epoch. Prices are finite and positive for
/// every ingested bar; the forward simulator keeps the same contract for the
/// bars it generates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Ordered sequence of bars, oldest first with strictly increasing
/// timestamps. Built once by the loader and replaced wholesale on reload;
/// nothing mutates a series after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    bars: Vec<Bar>,
}

impl HistorySeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Wrap an already-ordered vector of bars.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(time: i64, close: f64) -> Bar {
        Bar {
            time,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn empty_series_has_no_last_bar() {
        let series = HistorySeries::new();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
        assert!(series.bars().last().is_none());
    }

    #[test]
    fn from_bars_preserves_order_and_contents() {
        let bars = vec![
            sample_bar(1_700_000_000, 100.0),
            sample_bar(1_700_086_400, 101.0),
        ];
        let series = HistorySeries::from_bars(bars.clone());

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars().last().unwrap().time, 1_700_086_400);
        assert_eq!(series.bars(), bars.as_slice());
    }
}
