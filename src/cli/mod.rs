pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Commands};
pub use commands::{build_report, run};
pub use output::{LowestTemperature, QueryReport};
