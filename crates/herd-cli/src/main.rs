//! herd CLI - stage and merge wildlife statistics extracts into DuckDB

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{audit, init, merge, runs, stage};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global),
        cli::Commands::Stage(args) => stage::execute(args, &cli.global),
        cli::Commands::Merge(args) => merge::execute(args, &cli.global),
        cli::Commands::Audit(args) => audit::execute(args, &cli.global),
        cli::Commands::Runs(args) => runs::execute(args, &cli.global),
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// Route `log` records from the libraries to stderr.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
