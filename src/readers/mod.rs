pub mod temperature_reader;

pub use temperature_reader::{parse_record, ObservationIterator, TemperatureReader};
