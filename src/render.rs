// =============================================================================
// Chart Series Writer
// =============================================================================
//
// CSV sink for the extended series: the loaded history is written once, then
// each synthetic bar is appended as it is generated. Columns mirror the
// loader's `time,open,high,low,close` input format, so an extended series can
// be re-ingested directly.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::market_data::Bar;

pub struct CsvChartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvChartWriter<std::fs::File> {
    /// Create (or truncate) the output file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create chart CSV {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvChartWriter<W> {
    /// Wrap any writer (tests hand in a `Vec<u8>`).
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Write the full history in one pass. The header row goes out ahead of
    /// the first record.
    pub fn write_history(&mut self, bars: &[Bar]) -> Result<()> {
        for bar in bars {
            self.writer
                .serialize(bar)
                .context("failed to write chart CSV row")?;
        }
        self.writer.flush().context("failed to flush chart CSV")
    }

    /// Append one bar, flushed immediately so the output file always holds
    /// every bar generated so far.
    pub fn append_bar(&mut self, bar: &Bar) -> Result<()> {
        self.writer
            .serialize(bar)
            .context("failed to append chart CSV row")?;
        self.writer.flush().context("failed to flush chart CSV")
    }

    /// Flush any buffered rows and hand back the inner writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to finish chart CSV: {e}"))
    }
}
