//! formfill CLI: manage stored form answers and fill form pages with them.
//!
//! Answers are imported from two-column CSV files or edited one at a time,
//! kept in a local database, and written into form page snapshots.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
