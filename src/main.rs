use clap::Parser;
use station_temps::cli::{run, Cli};
use station_temps::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
