//! Destinations for ranked emission points.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// One exported point, in bulk-load column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRow {
    pub dataset_file: String,
    pub lat: f64,
    pub lon: f64,
    /// Sum over the time axis.
    pub monthly_emission: f64,
    /// Largest single time step.
    pub max_daily_emission: f64,
}

/// Receives ordered point rows.
///
/// Rows arrive ranked by descending `monthly_emission`; sinks must keep that
/// order.
pub trait PointSink {
    fn accept(&mut self, rows: &[PointRow]) -> Result<()>;

    /// Flush buffered output. Called once after the last batch.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl PointSink for Vec<PointRow> {
    fn accept(&mut self, rows: &[PointRow]) -> Result<()> {
        self.extend_from_slice(rows);
        Ok(())
    }
}

/// Writes rows as CSV. No header by default, matching the bulk-load input
/// `(dataset_file, lat, lng, monthly_emission, max_daily_emission)`.
pub struct CsvPointSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CsvPointSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_header(writer, false)
    }

    pub fn with_header(writer: W, header: bool) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(header)
                .from_writer(writer),
            rows: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("failed to flush CSV output: {}", e.error()))
    }
}

impl<W: Write> PointSink for CsvPointSink<W> {
    fn accept(&mut self, rows: &[PointRow]) -> Result<()> {
        for row in rows {
            self.writer
                .serialize(row)
                .with_context(|| format!("failed to write CSV row for {}", row.dataset_file))?;
            self.rows += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush CSV output")
    }
}
