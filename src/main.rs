mod aggregate;
mod budget_chart;
mod chart;
mod cli;
mod error;
mod fmt;
mod importer;
mod models;
mod pdf;
mod report;
mod settings;
mod utilization;
mod yearfrac;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::Cli;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::render::run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
