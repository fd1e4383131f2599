//! # tagrun CLI
//!
//! Host for the tagrun bridge: forwards its trailing arguments to a tagging
//! tool's `main` and exits with whatever that returns.
//!
//! `main` loads `.env`, parses flags, installs the tracing subscriber, reads
//! the layered config and only then dispatches. Anything that fails before
//! dispatch exits without touching the entry point.
//!
//! ## Exit codes
//!
//! `tagrun run` exits with the entry point's own status (low 8 bits). When
//! tagrun itself fails before the entry point is invoked:
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Entry point not found   |
//! |  4   | Configuration error     |

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version land here too, on stdout with status 0.
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 2 } else { 0 });
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("tagrun: cannot set up logging: {e}");
        return ExitCode::from(1);
    }
    debug!(global = ?cli.global, "arguments parsed");

    let config = match AppConfig::load(cli.global.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "configuration could not be loaded");
            eprintln!("tagrun: {e:#}");
            return ExitCode::from(4);
        }
    };

    let output = OutputManager::new(&cli.global, &config);
    let verbose = cli.global.verbose > 0;

    match dispatch(cli, config, output) {
        Ok(code) => code,
        Err(e) => report(&e, verbose),
    }
}

#[instrument(skip_all)]
fn dispatch(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Run(cmd) => commands::run::execute(cmd, config, output),
        Commands::Config(cmd) => commands::config::execute(cmd, config, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
    }
}

fn report(err: &CliError, verbose: bool) -> ExitCode {
    err.log();
    eprint!("{}", err.render(verbose, io::stderr().is_terminal()));
    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
