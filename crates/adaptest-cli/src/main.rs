//! adaptest CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "adaptest", version, about = "Computerized adaptive testing toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate adaptive exams against an item bank
    Simulate {
        /// Path to .toml item bank or directory
        #[arg(long)]
        bank: PathBuf,

        /// True abilities to simulate (comma-separated, default: -3..3)
        #[arg(long, allow_hyphen_values = true)]
        theta: Option<String>,

        /// Exams per ability point
        #[arg(long)]
        replications: Option<usize>,

        /// Base RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a recorded session from its response log
    Score {
        /// Response log JSON
        #[arg(long)]
        log: PathBuf,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the result to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate item bank TOML files
    Validate {
        /// Path to item bank file or directory
        #[arg(long)]
        bank: PathBuf,

        /// Exit with an error if any warning is found
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Show the CEFR levels with their anchors and band scores
    Levels,

    /// Create starter config and example item bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adaptest=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            bank,
            theta,
            replications,
            seed,
            output,
            format,
            config,
        } => commands::simulate::execute(
            bank,
            theta,
            replications,
            seed,
            output,
            format,
            config,
        ),
        Commands::Score {
            log,
            format,
            output,
            config,
        } => commands::score::execute(log, format, output, config),
        Commands::Validate {
            bank,
            deny_warnings,
        } => commands::validate::execute(bank, deny_warnings),
        Commands::Levels => commands::levels::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
