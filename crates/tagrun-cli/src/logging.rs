//! Tracing subscriber for the `tagrun` binary.
//!
//! The library crates only emit events; this is the one place a subscriber
//! is installed. Events go to stderr so that stdout stays free for the entry
//! point and for `--output-format json`.
//!
//! `--quiet` shows errors only. Otherwise the level starts at `warn` and each
//! `-v` lowers it one step, down to `trace`. A set `RUST_LOG` replaces the
//! whole computed filter.

use std::io::{self, IsTerminal as _};

use anyhow::Context as _;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::GlobalArgs;

/// Crates whose events pass the computed filter.
const TARGETS: [&str; 3] = ["tagrun", "tagrun_core", "tagrun_adapters"];

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::new(directives(level_for(args))),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(!args.no_color && io::stderr().is_terminal())
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("a tracing subscriber is already installed")
}

fn directives(level: LevelFilter) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn verbosity_maps_to_levels() {
        let cases = [
            (0, false, LevelFilter::WARN),
            (1, false, LevelFilter::INFO),
            (2, false, LevelFilter::DEBUG),
            (3, false, LevelFilter::TRACE),
            (9, false, LevelFilter::TRACE),
            (0, true, LevelFilter::ERROR),
            (3, true, LevelFilter::ERROR),
        ];
        for (verbose, quiet, expected) in cases {
            let args = GlobalArgs {
                verbose,
                quiet,
                no_color: true,
                config: None,
                output_format: OutputFormat::Auto,
            };
            assert_eq!(level_for(&args), expected, "-v x{verbose}, quiet={quiet}");
        }
    }

    #[test]
    fn directives_name_every_crate() {
        let text = directives(LevelFilter::DEBUG);
        assert_eq!(text.split(',').count(), TARGETS.len());
        for target in TARGETS {
            assert!(text.contains(&format!("{target}=")), "{target}");
        }
        assert!(EnvFilter::try_new(&text).is_ok());
    }
}
