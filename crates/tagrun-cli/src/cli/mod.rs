//! Flags and subcommands of `tagrun`, declared with clap's derive API.
//!
//! Parsing only. Target resolution and config merging happen in
//! `commands::run`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tagrun_core::domain::NulPolicy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name    = "tagrun",
    bin_name = "tagrun",
    version  = env!("CARGO_PKG_VERSION"),
    about    = "Run a tagging tool's C main with a marshaled argument vector",
    long_about = "tagrun copies its arguments into NUL-terminated buffers, \
                  builds a null-terminated argv, calls the tagging tool's \
                  entry point and exits with its status.",
    after_help = "EXAMPLES:\n\
        \x20 tagrun run -- ctags -R --fields=+n src/\n\
        \x20 tagrun run --library ./libctags.so --symbol ctags_main -- ctags -R .\n\
        \x20 tagrun run --dry-run -- tagfile --options src/\n\
        \x20 tagrun completions bash > /usr/share/bash-completion/completions/tagrun",
    subcommand_required = true,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Forward arguments to the entry point and exit with its status.
    #[command(
        visible_alias = "r",
        about = "Invoke the entry point",
        after_help = "EXAMPLES:\n\
            \x20 tagrun run -- ctags -R src/\n\
            \x20 tagrun run --program /usr/local/bin/uctags -- ctags --version\n\
            \x20 tagrun run --library ./libctags.so -- ctags -R .\n\
            \x20 tagrun --output-format json run --dry-run -- ctags -R ."
    )]
    Run(RunArgs),

    #[command(
        about = "Print a completion script for SHELL",
        after_help = "EXAMPLES:\n\
            \x20 tagrun completions bash > ~/.local/share/bash-completion/completions/tagrun\n\
            \x20 tagrun completions zsh  > ~/.zfunc/_tagrun\n\
            \x20 tagrun completions fish > ~/.config/fish/completions/tagrun.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Show the resolved configuration",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 tagrun config get entry_point.program\n\
            \x20 tagrun config list\n\
            \x20 tagrun config path"
    )]
    Config(ConfigCommands),
}

/// Arguments for `tagrun run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Shared library exporting the entry point.
    #[arg(
        short = 'l',
        long = "library",
        value_name = "PATH",
        conflicts_with = "program",
        help = "Load the entry point from a shared library"
    )]
    pub library: Option<PathBuf>,

    /// Symbol to resolve in `--library`.
    #[arg(
        short = 's',
        long = "symbol",
        value_name = "NAME",
        conflicts_with = "program",
        help = "Entry point symbol (default: main)"
    )]
    pub symbol: Option<String>,

    /// External program standing in for the entry point.
    #[arg(
        short = 'p',
        long = "program",
        value_name = "PATH",
        help = "Run an external program (default: ctags)"
    )]
    pub program: Option<PathBuf>,

    /// What to do with arguments containing a NUL byte.
    #[arg(
        long = "nul-policy",
        value_name = "POLICY",
        value_enum,
        help = "Interior NUL handling"
    )]
    pub nul_policy: Option<NulPolicyArg>,

    /// Print the marshaled vector instead of invoking.
    #[arg(long = "dry-run", help = "Show the marshaled argv without invoking")]
    pub dry_run: bool,

    /// Forwarded verbatim; the first becomes `argv[0]`.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Arguments for the entry point (argv[0] first)"
    )]
    pub args: Vec<OsString>,
}

/// CLI mirror of [`NulPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum NulPolicyArg {
    /// Copy the value unchanged; the callee sees it cut at the NUL.
    Preserve,
    /// Refuse the call.
    Reject,
}

impl From<NulPolicyArg> for NulPolicy {
    fn from(arg: NulPolicyArg) -> Self {
        match arg {
            NulPolicyArg::Preserve => NulPolicy::Preserve,
            NulPolicyArg::Reject => NulPolicy::Reject,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one resolved value.
    Get {
        /// Dotted key path, e.g. `entry_point.program`.
        key: String,
    },
    /// Print every section as TOML.
    List,
    /// Print where the per-user config file is looked up.
    Path,
}
