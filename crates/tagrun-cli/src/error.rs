//! Failures of tagrun itself, and how they reach the user.
//!
//! Whatever the entry point returns is its exit status, never a `CliError`.
//! These errors all happen before the entry point is invoked (or while
//! writing tagrun's own output), so their exit codes stay distinct from the
//! codes tagrun reserves for itself.

use std::error::Error as _;
use std::fmt::Write as _;

use owo_colors::{OwoColorize, Style};
use thiserror::Error;

use tagrun_core::error::{ErrorCategory as CoreCategory, TagrunError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Flags that parse but make no sense together.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Marshaling refused the arguments, or the entry point could not be
    /// reached.
    #[error("Invocation failed: {0}")]
    Core(#[from] TagrunError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Coarse classification that drives the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    /// Library, symbol or program missing.
    NotFound,
    Configuration,
    Internal,
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { .. } => {
                vec!["See 'tagrun run --help' for the accepted flag combinations".into()]
            }
            Self::ConfigError { .. } => vec![
                "Run 'tagrun config path' to locate the config file".into(),
                "Run 'tagrun config list' to see the resolved values".into(),
            ],
            Self::Core(core) => core.suggestions(),
            Self::IoError { .. } => vec!["Check that stdout is still open and writable".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Resource => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// 2 user error, 3 not found, 4 configuration, 1 anything else.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Message, cause chain (when `verbose`) and suggestions, ready for
    /// stderr. `color` adds ANSI styling.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: Style| -> String {
            if color {
                text.style(style).to_string()
            } else {
                text.to_owned()
            }
        };
        let dim = Style::new().dimmed();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "\n{} {self}",
            paint("\u{2717} Error:", Style::new().red().bold())
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let _ = writeln!(out, "  {}", paint(&format!("caused by: {err}"), dim));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Suggestions:", Style::new().yellow().bold())
            );
            for suggestion in &suggestions {
                let _ = writeln!(out, "  {suggestion}");
            }
        }

        if !verbose {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Run again with -v / --verbose for the full cause chain.", dim)
            );
        }
        out
    }

    /// One tracing event, at a level matching the category.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(error = %self, exit_code = self.exit_code(), "tagrun failed")
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(error = %self, exit_code = self.exit_code(), "tagrun failed")
            }
        }
    }
}
