use serde::Serialize;

use crate::models::{Reading, StationRecord};

/// Sum of absolute differences between successive temperatures.
///
/// Comparison starts from the second reading, so a single reading scores 0.
/// Callers are expected to pass a non-empty slice; an empty one also scores 0.
pub fn calculate_fluctuation(readings: &[Reading]) -> f64 {
    let Some((first, rest)) = readings.split_first() else {
        return 0.0;
    };

    let mut fluctuation = 0.0;
    let mut previous = first.temperature;
    for reading in rest {
        fluctuation += (previous - reading.temperature).abs();
        previous = reading.temperature;
    }

    fluctuation
}

/// Per-station overview used by reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station_id: String,
    pub reading_count: usize,
    pub lowest_temperature: Option<f64>,
    pub fluctuation: f64,
}

impl StationSummary {
    pub fn from_record(record: &StationRecord) -> Self {
        let mut lowest_temperature: Option<f64> = None;
        for reading in record.readings() {
            if reading.temperature < lowest_temperature.unwrap_or(f64::INFINITY) {
                lowest_temperature = Some(reading.temperature);
            }
        }

        Self {
            station_id: record.station_id.clone(),
            reading_count: record.len(),
            lowest_temperature,
            fluctuation: calculate_fluctuation(record.readings()),
        }
    }
}
