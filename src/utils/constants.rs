/// Number of fields in every data row: station id, date, temperature
pub const FIELDS_PER_ROW: usize = 3;

/// Column positions within a data row
pub const STATION_ID_FIELD: usize = 0;
pub const DATE_FIELD: usize = 1;
pub const TEMPERATURE_FIELD: usize = 2;

/// Input defaults
pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Configuration sources
pub const DEFAULT_CONFIG_FILE: &str = "station-temps.toml";
pub const ENV_PREFIX: &str = "STATION_TEMPS";

/// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_TARGET: &str = "station_temps";

/// Progress spinner refresh interval
pub const DEFAULT_PROGRESS_TICK_MS: u64 = 100;

/// Stations listed by `info` when no sample size is given
pub const DEFAULT_SAMPLE_SIZE: usize = 10;
