mod commands;
mod config;
mod metrics;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{ClassesArgs, ImportArgs, RelationsArgs};
use config::AppConfig;
use metrics::Metrics;

/// Significance-filtered relation index over biomedical extraction results
#[derive(Parser)]
#[command(name = "relidx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reified relations that pass the significance filter
    Relations {
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        results: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Write all reified relations, skipping the filter
        #[arg(long)]
        reified: bool,
    },

    /// Write a relation file for every document in a directory
    Import {
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        results: PathBuf,
        #[arg(long)]
        docs: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 100_000)]
        limit: usize,
        /// Also write the document relation index to this file
        #[arg(long)]
        index_out: Option<PathBuf>,
    },

    /// Show record types and the arguments they carry
    Characterize {
        #[arg(long)]
        results: PathBuf,
        /// Also count the identifiers in this metadata file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Write class-<role>s.txt reports
    Classes {
        #[arg(long)]
        results: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = AppConfig::load_or_default(cli.config.as_deref()).await?;
    let metrics = Metrics::new();

    match cli.command {
        Commands::Relations { metadata, results, out, reified } => {
            let args = RelationsArgs { metadata, results, out, reified };
            commands::relations(&args, &config, &metrics).await?;
        }
        Commands::Import { metadata, results, docs, out, limit, index_out } => {
            let args = ImportArgs { metadata, results, docs, out, limit, index_out };
            commands::import(&args, &config, &metrics).await?;
        }
        Commands::Characterize { results, metadata } => {
            commands::characterize(&results, metadata.as_deref()).await?;
            return Ok(());
        }
        Commands::Classes { results, out } => {
            let args = ClassesArgs { results, out };
            commands::classes(&args, &config, &metrics).await?;
        }
    }

    metrics.log_summary();
    Ok(())
}
