use std::collections::HashMap;
use tracing::{debug, info};

use crate::analyzers::{calculate_fluctuation, StationSummary};
use crate::error::{ProcessingError, Result};
use crate::models::{Observation, Reading, StationRecord};
use crate::utils::format_decimal;

/// Station id -> readings, built once and read-only afterwards.
///
/// Stations iterate in the order their ids were first seen in the input.
#[derive(Debug, Clone, Default)]
pub struct TemperatureStore {
    stations: Vec<StationRecord>,
    index: HashMap<String, usize>,
}

impl TemperatureStore {
    /// Group observations by station, keeping source order within each station.
    ///
    /// The first error aborts construction.
    pub fn build<I>(observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Observation>>,
    {
        let mut store = Self::default();
        for observation in observations {
            store.insert(observation?);
        }

        info!(
            "Loaded {} readings for {} stations",
            store.reading_count(),
            store.station_count()
        );
        Ok(store)
    }

    /// Build from raw `(station_id, date, temperature)` text triples.
    ///
    /// Rows are numbered from 1 in error messages.
    pub fn from_rows<I, S>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        Self::build(rows.into_iter().enumerate().map(|(i, (station_id, date, temp))| {
            Observation::parse(
                station_id.as_ref(),
                date.as_ref(),
                temp.as_ref(),
                i as u64 + 1,
            )
        }))
    }

    fn insert(&mut self, observation: Observation) {
        let Observation {
            station_id,
            reading,
        } = observation;

        let position = match self.index.get(&station_id) {
            Some(&position) => position,
            None => {
                let position = self.stations.len();
                debug!("New station {} at position {}", station_id, position);
                self.stations.push(StationRecord::new(station_id.clone()));
                self.index.insert(station_id, position);
                position
            }
        };

        self.stations[position].push(reading);
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn reading_count(&self) -> usize {
        self.stations.iter().map(StationRecord::len).sum()
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn station(&self, station_id: &str) -> Option<&StationRecord> {
        self.index.get(station_id).map(|&i| &self.stations[i])
    }

    /// The first reading holding the strictly lowest temperature.
    pub fn lowest_reading(&self) -> Option<(&StationRecord, &Reading)> {
        let mut lowest_temperature = f64::INFINITY;
        let mut lowest = None;

        for station in &self.stations {
            for reading in station.readings() {
                if reading.temperature < lowest_temperature {
                    lowest_temperature = reading.temperature;
                    lowest = Some((station, reading));
                }
            }
        }

        lowest
    }

    /// Station id and rendered date of the lowest temperature, `None` when there are no readings.
    pub fn get_lowest_temperature(&self) -> Option<(&str, String)> {
        self.lowest_reading()
            .map(|(station, reading)| (station.station_id.as_str(), format_decimal(reading.date)))
    }

    /// Station with the greatest fluctuation over its full history.
    pub fn get_most_fluctuation(&self) -> Option<&str> {
        select_most_fluctuation(
            self.stations
                .iter()
                .map(|s| (s.station_id.as_str(), calculate_fluctuation(s.readings()))),
        )
    }

    /// Station with the greatest fluctuation inside `[start_date, end_date]`.
    ///
    /// Each station's first reading is always left out. Stations with nothing
    /// left after filtering do not take part.
    pub fn get_most_fluctuation_in_range(&self, start_date: f64, end_date: f64) -> Option<&str> {
        let scores = self.stations.iter().filter_map(|station| {
            let in_range = station.readings_in_range(start_date, end_date);
            if in_range.is_empty() {
                return None;
            }
            Some((station.station_id.as_str(), calculate_fluctuation(&in_range)))
        });

        let winner = select_most_fluctuation(scores);
        debug!(
            "Most fluctuation in [{}, {}]: {:?}",
            start_date, end_date, winner
        );
        winner
    }

    /// Range query with textual bounds.
    pub fn get_most_fluctuation_between(&self, start_date: &str, end_date: &str) -> Result<Option<&str>> {
        let start_date = parse_bound(start_date)?;
        let end_date = parse_bound(end_date)?;
        Ok(self.get_most_fluctuation_in_range(start_date, end_date))
    }

    /// Full-history fluctuation for every station, in iteration order.
    pub fn fluctuations(&self) -> Vec<(&str, f64)> {
        self.stations
            .iter()
            .map(|s| (s.station_id.as_str(), calculate_fluctuation(s.readings())))
            .collect()
    }

    pub fn summaries(&self) -> Vec<StationSummary> {
        self.stations.iter().map(StationSummary::from_record).collect()
    }
}

fn parse_bound(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ProcessingError::InvalidBound {
            value: raw.to_string(),
        })
}

/// Strictly greatest score wins; the running maximum starts at negative
/// infinity so the first finite score always takes the lead.
///
/// A winner with an empty station id counts as no winner.
fn select_most_fluctuation<'a, I>(scores: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut max_fluctuation = f64::NEG_INFINITY;
    let mut winner = None;

    for (station_id, fluctuation) in scores {
        if fluctuation > max_fluctuation {
            max_fluctuation = fluctuation;
            winner = Some(station_id);
        }
    }

    winner.filter(|station_id| !station_id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(rows: &[(&str, f64, f64)]) -> TemperatureStore {
        TemperatureStore::build(
            rows.iter()
                .map(|&(station_id, date, temperature)| Ok(Observation::new(station_id, date, temperature))),
        )
        .unwrap()
    }

    #[test]
    fn test_groups_by_station_in_first_seen_order() {
        let store = store(&[
            ("69", 2000.1, 1.0),
            ("68", 2000.1, 2.0),
            ("69", 2000.2, 3.0),
            ("70", 2000.1, 4.0),
            ("68", 2000.0, 5.0),
        ]);

        let ids: Vec<&str> = store.stations().iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["69", "68", "70"]);
        assert_eq!(store.station_count(), 3);
        assert_eq!(store.reading_count(), 5);

        let readings = store.station("68").unwrap().readings();
        assert_eq!(readings[0], Reading::new(2000.1, 2.0));
        assert_eq!(readings[1], Reading::new(2000.0, 5.0));
        assert!(store.station("71").is_none());
    }

    #[test]
    fn test_build_fails_on_first_error() {
        let observations = vec![
            Ok(Observation::new("68", 2000.0, 1.0)),
            Err(ProcessingError::invalid_record(3, "invalid date: 'x'")),
            Ok(Observation::new("68", 2000.1, 1.0)),
        ];

        let err = TemperatureStore::build(observations).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidRecord { line: 3, .. }));
    }

    #[test]
    fn test_from_rows_coerces_text() {
        let store = TemperatureStore::from_rows(vec![("68", "2000.542", "-5.0")]).unwrap();
        assert_eq!(store.get_lowest_temperature(), Some(("68", "2000.542".to_string())));

        let err = TemperatureStore::from_rows(vec![
            ("68", "2000.542", "-5.0"),
            ("68", "2000.625", "cold"),
        ])
        .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidRecord { line: 2, .. }));
    }

    #[test]
    fn test_empty_store() {
        let store = TemperatureStore::build(Vec::<Result<Observation>>::new()).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.get_lowest_temperature(), None);
        assert_eq!(store.get_most_fluctuation(), None);
        assert_eq!(store.get_most_fluctuation_in_range(2000.0, 2001.0), None);
    }

    #[test]
    fn test_lowest_temperature_first_minimum_wins() {
        let store = store(&[
            ("68", 2000.375, 10.0),
            ("68", 2000.542, -5.0),
            ("68", 2000.875, -5.0),
            ("69", 2000.459, -5.0),
        ]);

        assert_eq!(store.get_lowest_temperature(), Some(("68", "2000.542".to_string())));
    }

    #[test]
    fn test_lowest_temperature_searches_all_stations() {
        let store = store(&[("68", 2000.0, -1.0), ("69", 2000.0, 3.0), ("70", 2001.0, -1.5)]);

        let (station, reading) = store.lowest_reading().unwrap();
        assert_eq!(station.station_id, "70");
        assert_eq!(reading.temperature, -1.5);
        assert_eq!(store.get_lowest_temperature(), Some(("70", "2001.0".to_string())));
    }

    #[test]
    fn test_most_fluctuation() {
        let store = store(&[
            ("68", 2000.0, 10.0),
            ("68", 2000.1, 20.0),
            ("69", 2000.0, 0.0),
            ("69", 2000.1, 30.0),
            ("70", 2000.0, 5.0),
        ]);

        assert_eq!(store.get_most_fluctuation(), Some("69"));
    }

    #[test]
    fn test_most_fluctuation_tie_keeps_first_station() {
        let store = store(&[
            ("68", 2000.0, 0.0),
            ("68", 2000.1, 10.0),
            ("69", 2000.0, 10.0),
            ("69", 2000.1, 0.0),
        ]);

        assert_eq!(store.get_most_fluctuation(), Some("68"));
    }

    #[test]
    fn test_all_zero_fluctuation_returns_first_station() {
        let store = store(&[("70", 2000.0, 1.0), ("68", 2000.0, 2.0)]);
        assert_eq!(store.get_most_fluctuation(), Some("70"));
    }

    #[test]
    fn test_range_skips_first_reading_even_inside_range() {
        let store = store(&[
            ("68", 2000.0, 10.0),
            ("68", 2000.1, 10.0),
            ("68", 2000.2, 20.0),
        ]);

        let in_range = store.station("68").unwrap().readings_in_range(2000.0, 2000.2);
        assert_eq!(calculate_fluctuation(&in_range), 10.0);
        assert_eq!(store.get_most_fluctuation_in_range(2000.0, 2000.2), Some("68"));
    }

    #[test]
    fn test_range_excludes_stations_without_readings_in_range() {
        // 69 only has its first reading inside the range, so it is left out
        // instead of being scored as zero against 68's zero.
        let store = store(&[
            ("69", 2000.5, 1.0),
            ("69", 2001.5, 9.0),
            ("68", 2000.0, 1.0),
            ("68", 2000.5, 4.0),
        ]);

        assert_eq!(store.get_most_fluctuation_in_range(2000.4, 2000.6), Some("68"));
    }

    #[test]
    fn test_range_tie_keeps_first_station() {
        // Both score 5 inside the range and 10 over their full history.
        let store = store(&[
            ("69", 2000.0, 0.0),
            ("69", 2000.1, 5.0),
            ("69", 2000.2, 0.0),
            ("68", 2000.0, 5.0),
            ("68", 2000.1, 0.0),
            ("68", 2000.2, 5.0),
        ]);

        assert_eq!(store.fluctuations(), vec![("69", 10.0), ("68", 10.0)]);
        assert_eq!(store.get_most_fluctuation_in_range(2000.1, 2000.2), Some("69"));
        assert_eq!(store.get_most_fluctuation(), Some("69"));
    }

    #[test]
    fn test_range_with_no_matches_returns_none() {
        let store = store(&[("68", 2000.0, 1.0), ("68", 2000.5, 4.0), ("69", 2000.0, 1.0)]);

        assert_eq!(store.get_most_fluctuation_in_range(2000.111, 2000.112), None);
        assert_eq!(store.get_most_fluctuation_in_range(2000.6, 2000.4), None);
    }

    #[test]
    fn test_range_with_textual_bounds() {
        let store = store(&[("68", 2000.0, 1.0), ("68", 2000.5, 4.0), ("68", 2000.7, 2.0)]);

        assert_eq!(store.get_most_fluctuation_between("2000.1", " 2001 ").unwrap(), Some("68"));

        let err = store.get_most_fluctuation_between("start", "2001").unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidBound { ref value } if value == "start"));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_empty_station_id_is_kept() {
        let store = store(&[("", 2000.1, -9.0), ("68", 2000.2, 2.0), ("68", 2000.3, 5.0)]);

        assert_eq!(store.station_count(), 2);
        assert_eq!(store.get_lowest_temperature(), Some(("", "2000.1".to_string())));
        assert_eq!(store.get_most_fluctuation(), Some("68"));
        assert_eq!(store.get_most_fluctuation_in_range(2000.0, 2001.0), Some("68"));
    }

    #[test]
    fn test_empty_station_id_winning_fluctuation_gives_none() {
        let store = store(&[
            ("", 2000.1, -9.0),
            ("", 2000.2, 9.0),
            ("", 2000.3, 0.0),
            ("68", 2000.2, 2.0),
            ("68", 2000.3, 5.0),
        ]);

        assert_eq!(store.get_most_fluctuation(), None);
        assert_eq!(store.get_most_fluctuation_in_range(2000.0, 2001.0), None);
        assert_eq!(store.get_lowest_temperature(), Some(("", "2000.1".to_string())));
    }

    #[test]
    fn test_textual_bounds_are_checked_on_empty_store() {
        let store = TemperatureStore::default();
        assert!(store.get_most_fluctuation_between("2000", "end").is_err());
    }

    #[test]
    fn test_queries_are_repeatable() {
        let store = store(&[
            ("68", 2000.0, 3.0),
            ("68", 2000.1, -2.0),
            ("69", 2000.0, 1.0),
            ("69", 2000.1, 8.0),
        ]);

        assert_eq!(store.get_lowest_temperature(), store.get_lowest_temperature());
        assert_eq!(store.get_most_fluctuation(), store.get_most_fluctuation());
        assert_eq!(
            store.get_most_fluctuation_in_range(2000.0, 2000.1),
            store.get_most_fluctuation_in_range(2000.0, 2000.1)
        );
        assert_eq!(store.reading_count(), 4);
    }

    #[test]
    fn test_fluctuations_and_summaries() {
        let store = store(&[("68", 2000.0, 10.0), ("68", 2000.1, 15.0), ("68", 2000.2, 5.0), ("69", 2000.0, 1.0)]);

        assert_eq!(store.fluctuations(), vec![("68", 15.0), ("69", 0.0)]);

        let summaries = store.summaries();
        assert_eq!(summaries[0].reading_count, 3);
        assert_eq!(summaries[0].lowest_temperature, Some(5.0));
        assert_eq!(summaries[1].fluctuation, 0.0);
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemperatureStore>();
    }
}
