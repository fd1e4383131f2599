//! Everything tagrun itself writes to stdout.
//!
//! The entry point inherits stdout and stderr and writes to them directly;
//! none of that passes through here.

use std::io::{self, IsTerminal};

use clap::ValueEnum as _;
use console::Term;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
    err_term: Term,
}

impl OutputManager {
    /// `--output-format` beats `output.format`. Whatever is still `auto`
    /// becomes `human` on a terminal and `plain` when piped. Only `human`
    /// output is ever colored.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let format = [
            args.output_format,
            OutputFormat::from_str(&config.output.format, true).unwrap_or_default(),
        ]
        .into_iter()
        .find(|f| *f != OutputFormat::Auto)
        .unwrap_or(if io::stdout().is_terminal() {
            OutputFormat::Human
        } else {
            OutputFormat::Plain
        });

        Self {
            format,
            quiet: args.quiet,
            no_color: args.no_color || config.output.no_color || format != OutputFormat::Human,
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.line(msg, None)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.line(&format!("\u{26a0} {msg}"), Some(Style::new().yellow().bold()))
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        self.line(text, Some(Style::new().cyan().bold()))
    }

    /// Pretty JSON. Not silenced by `--quiet`, since the document is the
    /// requested result.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        self.term.write_line(&serde_json::to_string_pretty(value)?)
    }

    /// Pretty JSON on stderr, for reports written after a child process
    /// has already used the shared stdout.
    pub fn json_stderr<T: Serialize>(&self, value: &T) -> io::Result<()> {
        self.err_term.write_line(&serde_json::to_string_pretty(value)?)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    #[cfg(test)]
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    fn line(&self, text: &str, style: Option<Style>) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        match style {
            Some(style) if !self.no_color => self.term.write_line(&text.style(style).to_string()),
            _ => self.term.write_line(text),
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
