use std::process::ExitCode;
use std::time::Instant;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::debug;

use sieve_logging::{Level, setup_logging};

use crate::find::FindArgs;

mod find;
mod settings;

#[derive(Parser)]
#[command(name = "sieve-dev")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Show debug messages.
    #[arg(global = true, long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Find the best distribution link for a requirement.
    Find(FindArgs),
}

fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Find(args) => find::find(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::Verbose
    } else {
        Level::Default
    };

    let start = Instant::now();
    let result = setup_logging(level).and_then(|()| run(cli.command));
    debug!("Took {}ms", start.elapsed().as_millis());
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", "sieve-dev failed".red().bold());
            for err in err.chain() {
                eprintln!("  {}: {}", "Caused by".red().bold(), err);
            }
            ExitCode::FAILURE
        }
    }
}
