use serde::Serialize;

use crate::error::{ProcessingError, Result};

/// A single (date, temperature) pair as it appeared in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub date: f64,
    pub temperature: f64,
}

impl Reading {
    pub fn new(date: f64, temperature: f64) -> Self {
        Self { date, temperature }
    }

    /// Inclusive on both ends; an inverted range matches nothing.
    pub fn is_within(&self, start_date: f64, end_date: f64) -> bool {
        self.date >= start_date && self.date <= end_date
    }
}

/// A reading tagged with the station that reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub station_id: String,
    pub reading: Reading,
}

impl Observation {
    pub fn new(station_id: impl Into<String>, date: f64, temperature: f64) -> Self {
        Self {
            station_id: station_id.into(),
            reading: Reading::new(date, temperature),
        }
    }

    /// Coerce the three textual fields of a data row.
    ///
    /// Numeric fields are trimmed before parsing; the station id is kept as-is,
    /// empty included.
    pub fn parse(station_id: &str, date: &str, temperature: &str, line: u64) -> Result<Self> {
        let date = parse_number(date, "date", line)?;
        let temperature = parse_number(temperature, "temperature", line)?;

        Ok(Self::new(station_id, date, temperature))
    }
}

/// Parse a numeric field, reporting the field name and line on failure
pub fn parse_number(raw: &str, field: &str, line: u64) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        ProcessingError::invalid_record(line, format!("invalid {}: '{}'", field, raw))
    })
}
