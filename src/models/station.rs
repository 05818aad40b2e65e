use serde::Serialize;

use super::Reading;

/// All readings reported by one station, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station_id: String,
    readings: Vec<Reading>,
}

impl StationRecord {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            readings: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings after the first one whose date falls inside `[start_date, end_date]`.
    ///
    /// The first reading is dropped regardless of its date.
    pub fn readings_in_range(&self, start_date: f64, end_date: f64) -> Vec<Reading> {
        self.readings
            .iter()
            .skip(1)
            .filter(|r| r.is_within(start_date, end_date))
            .copied()
            .collect()
    }
}
