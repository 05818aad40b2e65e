use crate::config::OutputFormat;
use crate::utils::constants::DEFAULT_SAMPLE_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-temps")]
#[command(about = "Lowest-temperature and fluctuation queries over station temperature CSV data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and errors"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: station-temps.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Output format [default: text]")]
    pub format: Option<OutputFormat>,
}

impl Cli {
    /// Log level implied by the verbosity flags, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the lowest recorded temperature with its station and date
    Lowest {
        #[arg(short, long, help = "Input CSV file")]
        input_file: Option<PathBuf>,
    },

    /// Find the station with the most temperature fluctuation over its full history
    Fluctuation {
        #[arg(short, long, help = "Input CSV file")]
        input_file: Option<PathBuf>,
    },

    /// Find the station with the most temperature fluctuation within a date range
    Range {
        #[arg(short, long, help = "Input CSV file")]
        input_file: Option<PathBuf>,

        #[arg(short, long, allow_hyphen_values = true, help = "First date of the range (inclusive)")]
        start: String,

        #[arg(short, long, allow_hyphen_values = true, help = "Last date of the range (inclusive)")]
        end: String,
    },

    /// Show station and reading counts with per-station fluctuation
    Info {
        #[arg(short, long, help = "Input CSV file")]
        input_file: Option<PathBuf>,

        #[arg(
            short,
            long,
            default_value_t = DEFAULT_SAMPLE_SIZE,
            help = "Number of stations to list (0 = none)"
        )]
        sample: usize,
    },

    /// Run every query against a single load of the data
    Report {
        #[arg(short, long, help = "Input CSV file")]
        input_file: Option<PathBuf>,

        #[arg(short, long, allow_hyphen_values = true, requires = "end")]
        start: Option<String>,

        #[arg(short, long, allow_hyphen_values = true, requires = "start")]
        end: Option<String>,
    },
}

impl Commands {
    pub fn input_file(&self) -> Option<&PathBuf> {
        match self {
            Commands::Lowest { input_file }
            | Commands::Fluctuation { input_file }
            | Commands::Range { input_file, .. }
            | Commands::Info { input_file, .. }
            | Commands::Report { input_file, .. } => input_file.as_ref(),
        }
    }
}
