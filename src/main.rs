mod commands;
mod config;
mod context;
mod executor;
mod output;
mod prompt;
mod state;
mod test_helpers;
mod traits;

use anyhow::Result;
use clap::Parser;
use commands::{MoveCommand, MoveOutcome};
use config::{Flavor, MoveConfig};
use context::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use traits::Interrupted;

/// Exit code used when the operator interrupts the run (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Parser)]
#[command(name = "tfmove")]
#[command(about = "Interactively move resources from one Terraform state to another", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory for the downloaded state files (defaults to ./tmp)
    #[arg(long, env = "TFMOVE_SCRATCH_DIR", value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Binary that runs the state commands
    #[arg(long, value_enum, env = "TFMOVE_FLAVOR", default_value_t = Flavor::Terraform)]
    flavor: Flavor,

    /// Do not list the local state files after moving
    #[arg(long)]
    no_verify: bool,

    /// Diagnostic logging on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Prompts read Ctrl-C as a key; this only fires while an external command runs
    if let Err(err) = ctrlc::set_handler(|| {
        output::error("Interrupted; local state files may be incomplete");
        std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
    }) {
        tracing::warn!(error = %err, "could not install interrupt handler");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<Interrupted>().is_some() => {
            output::warning("Interrupted by operator");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            output::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MoveConfig::resolve(cli.scratch_dir, cli.flavor, !cli.no_verify)?;
    tracing::debug!(?config, "resolved configuration");

    let ctx = Context::new();
    match MoveCommand::execute(&ctx, &config)? {
        MoveOutcome::Uploaded { moved } => {
            tracing::info!(count = moved.len(), "resources moved and uploaded");
        }
        MoveOutcome::MovedLocally { moved } => {
            tracing::info!(count = moved.len(), "resources moved locally only");
        }
        outcome => tracing::info!(?outcome, "move session finished without changes"),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tfmove={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
