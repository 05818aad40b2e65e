use crate::analyzers::StationSummary;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::store::TemperatureStore;
use crate::utils::format_decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowestTemperature {
    pub station_id: String,
    pub date: String,
    pub temperature: f64,
}

impl LowestTemperature {
    pub fn from_store(store: &TemperatureStore) -> Option<Self> {
        store.lowest_reading().map(|(station, reading)| Self {
            station_id: station.station_id.clone(),
            date: format_decimal(reading.date),
            temperature: reading.temperature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Everything a command can print; absent parts are skipped in both formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_temperature: Option<Option<LowestTemperature>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_fluctuation: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_fluctuation_in_range: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_count: Option<usize>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<StationSummary>,
}

impl QueryReport {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut lines = Vec::new();

        if let (Some(stations), Some(readings)) = (self.station_count, self.reading_count) {
            lines.push(format!("Stations: {}, Readings: {}", stations, readings));
        }

        if let Some(lowest) = &self.lowest_temperature {
            lines.push(match lowest {
                Some(l) => format!(
                    "Lowest temperature: {} at station {} on {}",
                    format_decimal(l.temperature),
                    l.station_id,
                    l.date
                ),
                None => "Lowest temperature: no readings found".to_string(),
            });
        }

        if let Some(most) = &self.most_fluctuation {
            lines.push(match most {
                Some(station_id) => format!("Most fluctuation: station {}", station_id),
                None => "Most fluctuation: no stations found".to_string(),
            });
        }

        if let Some(most) = &self.most_fluctuation_in_range {
            let range = self
                .range
                .as_ref()
                .map(|r| format!(" between {} and {}", r.start, r.end))
                .unwrap_or_default();
            lines.push(match most {
                Some(station_id) => {
                    format!("Most fluctuation{}: station {}", range, station_id)
                }
                None => format!("Most fluctuation{}: no readings in range", range),
            });
        }

        if !self.stations.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "{:<12} {:>10} {:>12} {:>12}",
                "Station", "Readings", "Lowest", "Fluctuation"
            ));
            for summary in &self.stations {
                let lowest = summary
                    .lowest_temperature
                    .map(format_decimal)
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!(
                    "{:<12} {:>10} {:>12} {:>12.3}",
                    summary.station_id, summary.reading_count, lowest, summary.fluctuation
                ));
            }
        }

        lines.join("\n")
    }
}
