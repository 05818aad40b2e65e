use crate::cli::args::{Cli, Commands};
use crate::cli::output::{DateRange, LowestTemperature, QueryReport};
use crate::config::{OutputFormat, Settings};
use crate::error::{ProcessingError, Result};
use crate::store::TemperatureStore;
use crate::utils::constants::LOG_TARGET;
use crate::utils::progress::ProgressReporter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level_override() {
        settings.log_level = level.to_string();
    }
    if let Some(format) = cli.format {
        settings.output_format = format;
    }

    setup_logging(&settings, cli.quiet, cli.log_file.as_deref())?;

    let input_file = resolve_input_file(&cli.command, &settings)?;
    let silent = cli.quiet || settings.output_format == OutputFormat::Json;
    let store = load_store(input_file, &settings, silent).await?;

    let report = build_report(&cli.command, &store)?;
    println!("{}", report.render(settings.output_format)?);

    Ok(())
}

/// Answer the selected command against a loaded store
pub fn build_report(command: &Commands, store: &TemperatureStore) -> Result<QueryReport> {
    let mut report = QueryReport::default();

    match command {
        Commands::Lowest { .. } => {
            report.lowest_temperature = Some(LowestTemperature::from_store(store));
        }

        Commands::Fluctuation { .. } => {
            report.most_fluctuation = Some(store.get_most_fluctuation().map(str::to_string));
        }

        Commands::Range { start, end, .. } => {
            add_range(&mut report, store, start, end)?;
        }

        Commands::Info { sample, .. } => {
            report.station_count = Some(store.station_count());
            report.reading_count = Some(store.reading_count());
            report.stations = store.summaries().into_iter().take(*sample).collect();
        }

        Commands::Report { start, end, .. } => {
            report.station_count = Some(store.station_count());
            report.reading_count = Some(store.reading_count());
            report.lowest_temperature = Some(LowestTemperature::from_store(store));
            report.most_fluctuation = Some(store.get_most_fluctuation().map(str::to_string));
            if let (Some(start), Some(end)) = (start, end) {
                add_range(&mut report, store, start, end)?;
            }
        }
    }

    Ok(report)
}

fn add_range(report: &mut QueryReport, store: &TemperatureStore, start: &str, end: &str) -> Result<()> {
    let winner = store.get_most_fluctuation_between(start, end)?;
    report.range = Some(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    });
    report.most_fluctuation_in_range = Some(winner.map(str::to_string));
    Ok(())
}

fn resolve_input_file(command: &Commands, settings: &Settings) -> Result<PathBuf> {
    command
        .input_file()
        .or(settings.input_file.as_ref())
        .cloned()
        .ok_or_else(|| {
            ProcessingError::MissingData(
                "no input file given; pass --input-file or set input_file in settings".to_string(),
            )
        })
}

/// Load the CSV on the blocking pool while a spinner runs
async fn load_store(path: PathBuf, settings: &Settings, silent: bool) -> Result<TemperatureStore> {
    let progress = ProgressReporter::new_spinner(
        "Preparing reader...",
        settings.progress_tick_ms,
        silent,
    );

    let reader = settings.reader()?;
    progress.set_message(&format!("Loading {}...", path.display()));
    let store = tokio::task::spawn_blocking(move || reader.read_store(&path)).await??;

    progress.finish_with_message(&format!(
        "Loaded {} readings from {} stations",
        store.reading_count(),
        store.station_count()
    ));
    info!(
        "Store ready: {} stations, {} readings",
        store.station_count(),
        store.reading_count()
    );
    Ok(store)
}

/// Set up structured logging on stderr, or in `log_file` when given
fn setup_logging(settings: &Settings, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, settings.log_level)));

    let result = if let Some(path) = log_file {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .try_init()
    } else if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", settings.log_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;

    fn sample_store() -> TemperatureStore {
        TemperatureStore::build(vec![
            Ok(Observation::new("68", 2000.375, 10.0)),
            Ok(Observation::new("68", 2000.459, 8.0)),
            Ok(Observation::new("69", 2000.375, 0.0)),
            Ok(Observation::new("69", 2000.459, -5.0)),
            Ok(Observation::new("69", 2000.542, 5.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_report_command_runs_every_query() {
        let command = Commands::Report {
            input_file: None,
            start: Some("2000.4".to_string()),
            end: Some("2000.6".to_string()),
        };

        let report = build_report(&command, &sample_store()).unwrap();

        assert_eq!(report.station_count, Some(2));
        assert_eq!(report.reading_count, Some(5));
        assert_eq!(report.most_fluctuation, Some(Some("69".to_string())));
        assert_eq!(report.most_fluctuation_in_range, Some(Some("69".to_string())));
        let lowest = report.lowest_temperature.flatten().unwrap();
        assert_eq!(lowest.station_id, "69");
        assert_eq!(lowest.date, "2000.459");
    }

    #[test]
    fn test_range_command_rejects_bad_bounds() {
        let command = Commands::Range {
            input_file: None,
            start: "2000".to_string(),
            end: "later".to_string(),
        };

        let err = build_report(&command, &sample_store()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_info_command_limits_sample() {
        let command = Commands::Info {
            input_file: None,
            sample: 1,
        };

        let report = build_report(&command, &sample_store()).unwrap();
        assert_eq!(report.stations.len(), 1);
        assert_eq!(report.stations[0].station_id, "68");
        assert_eq!(report.stations[0].fluctuation, 2.0);
    }

    #[test]
    fn test_input_file_falls_back_to_settings() {
        let settings = Settings {
            input_file: Some(PathBuf::from("configured.csv")),
            ..Settings::default()
        };
        let command = Commands::Lowest { input_file: None };
        assert_eq!(
            resolve_input_file(&command, &settings).unwrap(),
            PathBuf::from("configured.csv")
        );

        let command = Commands::Lowest {
            input_file: Some(PathBuf::from("given.csv")),
        };
        assert_eq!(
            resolve_input_file(&command, &settings).unwrap(),
            PathBuf::from("given.csv")
        );

        let err = resolve_input_file(&command_without_input(), &Settings::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingData(_)));
    }

    fn command_without_input() -> Commands {
        Commands::Fluctuation { input_file: None }
    }
}
