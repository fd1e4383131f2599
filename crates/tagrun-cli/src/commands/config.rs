//! `tagrun config`: inspect the resolved configuration.

use std::process::ExitCode;

use serde::Serialize;

use crate::{
    cli::{ConfigCommands, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: ConfigCommands,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<ExitCode> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = lookup(&config, &key)?;
            if output.format() == OutputFormat::Json {
                output.json(&KeyValue { key: &key, value: &value })?;
            } else {
                output.print(&value)?;
            }
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                output.json(&config)?;
            } else {
                output.header("# resolved configuration")?;
                let serialised =
                    toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                        message: format!("cannot render configuration as TOML: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                output.print(serialised.trim_end())?;
            }
        }

        ConfigCommands::Path => {
            output.print(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct KeyValue<'a> {
    key: &'a str,
    value: &'a str,
}

/// Unset optional keys resolve to an empty string.
fn lookup(config: &AppConfig, key: &str) -> CliResult<String> {
    let path = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    match key {
        "entry_point.library" => Ok(path(&config.entry_point.library)),
        "entry_point.symbol" => Ok(config.entry_point.symbol.clone()),
        "entry_point.program" => Ok(config.entry_point.program_or_default().display().to_string()),
        "marshal.nul_policy" => Ok(config.marshal.nul_policy.to_string()),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.clone()),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
