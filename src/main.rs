// fleetflow_access - main.rs
// Command-line entry point for the section-level permission resolver

use clap::Parser;
use fleetflow_access::cli::{dispatch, Cli};
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}
