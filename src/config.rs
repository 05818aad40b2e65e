//! Layered runtime settings.
//!
//! Sources are merged in order: built-in defaults, an optional settings file,
//! then `STATION_TEMPS_*` environment variables. Command-line flags are
//! applied on top by the CLI.

use crate::error::{ProcessingError, Result};
use crate::readers::TemperatureReader;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_PROGRESS_TICK_MS, ENV_PREFIX,
};
use clap::ValueEnum;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// CSV file used when a command is given no `--input-file`
    pub input_file: Option<PathBuf>,

    /// Whether the first row is a header to skip
    pub has_header: bool,

    #[validate(length(equal = 1))]
    pub delimiter: String,

    pub use_mmap: bool,

    pub output_format: OutputFormat,

    #[validate(length(min = 1))]
    pub log_level: String,

    #[validate(range(min = 10, max = 1000))]
    pub progress_tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_file: None,
            has_header: true,
            delimiter: ",".to_string(),
            use_mmap: false,
            output_format: OutputFormat::Text,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            progress_tick_ms: DEFAULT_PROGRESS_TICK_MS,
        }
    }
}

impl Settings {
    /// Load settings from defaults, `path` (or the default file if present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("has_header", true)?
            .set_default("delimiter", ",")?
            .set_default("use_mmap", false)?
            .set_default("output_format", "text")?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("progress_tick_ms", DEFAULT_PROGRESS_TICK_MS as i64)?;

        builder = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ProcessingError::Config(format!(
                        "Settings file not found: {}",
                        path.display()
                    )));
                }
                builder.add_source(File::from(path))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(ProcessingError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }

    /// Reader configured from these settings
    pub fn reader(&self) -> Result<TemperatureReader> {
        Ok(TemperatureReader::new()
            .with_has_header(self.has_header)
            .with_delimiter(self.delimiter_byte()?)
            .with_mmap(self.use_mmap))
    }
}
