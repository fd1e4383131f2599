//! Settings of the `tagrun` binary.
//!
//! Later layers override earlier ones: built-in defaults, then the TOML file
//! (`--config FILE`, else [`AppConfig::config_path`]), then environment
//! variables named `TAGRUN__<SECTION>__<KEY>`, for example
//! `TAGRUN__ENTRY_POINT__PROGRAM=/usr/bin/uctags`. Command-line flags are
//! applied on top by each command. The core crate never sees this type.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tagrun_adapters::{DEFAULT_PROGRAM, DEFAULT_SYMBOL};
use tagrun_core::domain::NulPolicy;

/// Prefix shared by every environment override.
const ENV_PREFIX: &str = "TAGRUN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which entry point `run` calls.
    pub entry_point: EntryPointConfig,
    /// Marshaling settings.
    pub marshal: MarshalConfig,
    pub output: OutputConfig,
}

/// A library takes precedence over a program when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPointConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalConfig {
    pub nul_policy: NulPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` overrides it.
    pub format: String,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            library: None,
            symbol: DEFAULT_SYMBOL.to_owned(),
            program: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl EntryPointConfig {
    /// The program `run` falls back to when no library is configured.
    pub fn program_or_default(&self) -> &Path {
        self.program
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PROGRAM))
    }
}

impl AppConfig {
    /// A file named with `--config` must exist. The per-user file is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, required: bool, env: Environment) -> anyhow::Result<Self> {
        tracing::debug!(path = %path.display(), required, "Loading configuration");

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(env.separator("__"))
            .build()
            .with_context(|| format!("Failed to read {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Invalid configuration value")
    }

    /// Per-user `config.toml`, or `.tagrun.toml` in the working directory
    /// when no home directory can be determined.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tagrun", "tagrun")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".tagrun.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(config::Map::new()))
    }

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(vars))
    }

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.entry_point.symbol, "main");
        assert_eq!(cfg.entry_point.program_or_default(), Path::new("ctags"));
        assert!(cfg.entry_point.library.is_none());
        assert_eq!(cfg.marshal.nul_policy, NulPolicy::Preserve);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn missing_optional_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml"), false, no_env()).unwrap();
        assert_eq!(cfg.entry_point.symbol, "main");
    }

    #[test]
    fn missing_required_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from(&dir.path().join("absent.toml"), true, no_env());
        assert!(result.is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
[entry_point]
program = "/opt/ctags/bin/ctags"

[marshal]
nul_policy = "reject"
"#,
        );

        let cfg = AppConfig::load_from(&path, true, no_env()).unwrap();
        assert_eq!(
            cfg.entry_point.program_or_default(),
            Path::new("/opt/ctags/bin/ctags")
        );
        assert_eq!(cfg.marshal.nul_policy, NulPolicy::Reject);
        // Untouched keys keep their defaults.
        assert_eq!(cfg.entry_point.symbol, "main");
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[entry_point]\nsymbol = \"ctags_main\"\n");

        let cfg = AppConfig::load_from(
            &path,
            true,
            env(&[
                ("TAGRUN__ENTRY_POINT__SYMBOL", "uctags_main"),
                ("TAGRUN__OUTPUT__NO_COLOR", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.entry_point.symbol, "uctags_main");
        assert!(cfg.output.no_color);
    }

    #[test]
    fn unknown_policy_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[marshal]\nnul_policy = \"strip\"\n");
        assert!(AppConfig::load_from(&path, true, no_env()).is_err());
    }

    #[test]
    fn config_path_is_non_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
