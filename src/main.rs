//! Main entry point for the dna-classifier application.
//!
//! Trains a linear classifier that separates protein-coding from
//! non-coding DNA using overlapping 6-mer counts, and serves the fitted
//! model over HTTP.

// Modules defined within the project
mod bio;
mod classifier;
mod cli;
mod config;
mod count_table;
mod io;
mod pipeline;
mod server;
mod stats;
mod vectorizer;
use cli::{run_cli, Cli};

// External Crate Imports
use anyhow::Result;
use clap::Parser;
use log::info;

/// Main function: initializes logging, parses arguments and dispatches.
fn main() -> Result<()> {
    // Default to info so training progress is visible; RUST_LOG overrides.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting {} with arguments: {:?}", env!("CARGO_PKG_NAME"), cli);

    run_cli(cli)?;

    info!("Finished successfully.");
    Ok(())
}
