use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{TrainConfig, DEFAULT_DATASET, KMER_SIZE, RANDOM_STATE};
use crate::pipeline::{generate_report, run_training};
use crate::server::{self, ServiceContext};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Classify DNA sequences as coding or non-coding from their k-mer profile",
    long_about = None
)]
pub struct Cli {
    /// Directory holding dna_model.json and vectorizer.json
    #[arg(short, long, env = "DNA_ARTIFACT_DIR", default_value = ".", global = true)]
    pub artifact_dir: PathBuf,

    /// Number of threads to use (0 = one per core)
    #[arg(short, long, default_value_t = 0, global = true)]
    pub threads: usize,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the vectorizer and classifier from a labelled CSV and save both
    Train {
        /// CSV with `DNA_sequence` and `Target` columns
        #[arg(short, long, env = "DNA_DATASET", default_value = DEFAULT_DATASET)]
        dataset: PathBuf,

        /// Fraction of each class held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Inverse regularisation strength of the linear SVM
        #[arg(short, long, default_value_t = 1.0)]
        c: f64,

        /// Solver stopping tolerance
        #[arg(long, default_value_t = 1e-4)]
        tol: f64,

        /// Maximum solver passes over the training rows
        #[arg(long, default_value_t = 20_000)]
        max_iter: usize,

        /// Seed for balancing, splitting and the solver
        #[arg(long, default_value_t = RANDOM_STATE)]
        seed: u64,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to bind
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },

    /// Classify a single sequence with the saved artifacts
    Predict {
        /// Nucleotide sequence to classify
        #[arg(short, long)]
        sequence: String,
    },
}

/// Main entry point for CLI
pub fn run_cli(cli: Cli) -> Result<()> {
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()?;
        info!("Using {} threads.", cli.threads);
    }

    match cli.command {
        Commands::Train {
            dataset,
            test_size,
            c,
            tol,
            max_iter,
            seed,
        } => {
            let config = TrainConfig {
                dataset_path: dataset,
                artifact_dir: cli.artifact_dir,
                k: KMER_SIZE,
                test_size,
                seed,
                c,
                tol,
                max_iter,
            };
            info!("Training configuration: {:?}", config);

            let summary = run_training(&config)?;
            println!("{}", generate_report(&summary));
        }

        Commands::Serve { host, port } => {
            // Artifacts must load before anything is bound.
            let ctx = ServiceContext::load(&cli.artifact_dir, KMER_SIZE)?;
            let addr = SocketAddr::new(host, port);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(Arc::new(ctx), addr))?;
        }

        Commands::Predict { sequence } => {
            let ctx = ServiceContext::load(&cli.artifact_dir, KMER_SIZE)?;
            let label = ctx.predict(&sequence)?;
            println!("Prediction: {} ({})", label, label.meaning());
        }
    }

    Ok(())
}
