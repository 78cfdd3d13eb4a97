//! etdsaf - convert a directory of ProQuest ETD packages into a SAF tree.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use etdsaf::{run_batch, SafConfig};
use tracing_subscriber::EnvFilter;

/// Exit status after a user interrupt.
const INTERRUPT_EXIT_CODE: i32 = 131;

/// Convert ProQuest ETD export packages into Simple Archive Format directories.
#[derive(Debug, Parser)]
#[command(name = "etdsaf", version, about)]
struct Cli {
    /// Location of the data to create SAFs from
    data_location: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory in which the SimpleArchiveFormat tree is created [default: current directory]
    #[arg(short, long)]
    output_root: Option<PathBuf>,

    /// Log each item and copied file
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = ctrlc::set_handler(|| {
        std::process::exit(INTERRUPT_EXIT_CODE);
    }) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SafConfig::load(path)?,
        None => SafConfig::default(),
    };
    let working_dir = match &cli.output_root {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let summary = run_batch(&cli.data_location, &working_dir, &config)
        .with_context(|| format!("converting {}", cli.data_location.display()))?;

    if let Some(dir) = summary.output_dir {
        println!("{} was created", dir.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "etdsaf=debug" } else { "etdsaf=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
