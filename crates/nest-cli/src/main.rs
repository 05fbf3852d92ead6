//! Nest CLI - Command-line interface for the nest relation engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, place, snapshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nest")]
#[command(about = "Live containment relations and validation over placed regions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and settle a layout, then show every entity's state
    Check {
        /// Catalog file, or a directory containing catalog/*.toml
        catalog: String,

        /// Directory holding the saved layout
        #[arg(long)]
        layout: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Move one region and save the layout
    Place {
        /// Catalog file, or a directory containing catalog/*.toml
        catalog: String,

        /// Entity id
        id: String,

        /// Region index on the entity
        index: usize,

        #[arg(allow_negative_numbers = true)]
        left: f64,

        #[arg(allow_negative_numbers = true)]
        top: f64,

        #[arg(allow_negative_numbers = true)]
        right: f64,

        #[arg(allow_negative_numbers = true)]
        bottom: f64,

        /// Directory holding the saved layout
        #[arg(long)]
        layout: String,
    },

    /// Write the current layout snapshot
    Snapshot {
        /// Catalog file, or a directory containing catalog/*.toml
        catalog: String,

        /// Directory holding the saved layout
        #[arg(long)]
        layout: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            catalog,
            layout,
            format,
        } => check::run(check::CheckArgs {
            catalog,
            layout,
            format,
        }),
        Commands::Place {
            catalog,
            id,
            index,
            left,
            top,
            right,
            bottom,
            layout,
        } => place::run(place::PlaceArgs {
            catalog,
            id,
            index,
            edges: [left, top, right, bottom],
            layout,
        }),
        Commands::Snapshot { catalog, layout } => snapshot::run(&catalog, &layout),
    }
}
