//! `tagrun run`: marshal the trailing arguments and call the entry point.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;
use tracing::{debug, info, instrument};

use tagrun_adapters::{CommandEntryPoint, DynamicEntryPoint};
use tagrun_core::{
    application::{MarshalService, ports::EntryPoint},
    domain::{ArgumentList, NativeArgv, NulPolicy},
    error::TagrunError,
};

use crate::{
    cli::{OutputFormat, RunArgs},
    config::{AppConfig, EntryPointConfig},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Run the command and return the entry point's status as the exit code.
#[instrument(skip_all, fields(argc = args.args.len(), dry_run = args.dry_run))]
pub fn execute(args: RunArgs, config: AppConfig, output: OutputManager) -> CliResult<ExitCode> {
    let target = Target::resolve(&args, &config.entry_point)?;
    let policy = args
        .nul_policy
        .map(NulPolicy::from)
        .unwrap_or(config.marshal.nul_policy);
    let arguments: ArgumentList = args.args.into_iter().collect();
    debug!(%target, %policy, "Resolved entry point");

    if args.dry_run {
        dry_run(&target, &arguments, policy, &output)?;
        return Ok(ExitCode::SUCCESS);
    }

    let service = MarshalService::new(target.open()?).with_nul_policy(policy);
    let status = service.run(&arguments)?;
    info!(entry_point = service.entry_point_name(), %status, "Invocation finished");

    // The entry point shares stdout, so the report goes to stderr.
    if output.format() == OutputFormat::Json {
        output.json_stderr(&RunReport {
            entry_point: service.entry_point_name(),
            code: status.code(),
        })?;
    }

    Ok(ExitCode::from(status.shell_code()))
}

// ── entry point selection ─────────────────────────────────────────────────────

/// Where the call goes, after merging flags over config.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Library { path: PathBuf, symbol: String },
    Program(PathBuf),
}

impl Target {
    /// `--program` beats any library; a library (flag or config) beats the
    /// configured program; `ctags` on `PATH` is the last resort.
    fn resolve(args: &RunArgs, config: &EntryPointConfig) -> CliResult<Self> {
        if let Some(program) = &args.program {
            return Ok(Self::Program(program.clone()));
        }

        match args.library.as_ref().or(config.library.as_ref()) {
            Some(path) => Ok(Self::Library {
                path: path.clone(),
                symbol: args.symbol.clone().unwrap_or_else(|| config.symbol.clone()),
            }),
            None if args.symbol.is_some() => Err(CliError::InvalidInput {
                message: "--symbol needs --library or entry_point.library".into(),
            }),
            None => Ok(Self::Program(config.program_or_default().to_path_buf())),
        }
    }

    fn open(&self) -> CliResult<Box<dyn EntryPoint>> {
        match self {
            Self::Library { path, symbol } => {
                // SAFETY: the user named this library as the tool to run, and
                // `symbol` as its C `main`. tagrun cannot check either claim.
                let entry = unsafe { DynamicEntryPoint::load(path, symbol) }?;
                Ok(Box::new(entry))
            }
            Self::Program(path) => Ok(Box::new(CommandEntryPoint::new(path.clone()))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library { path, symbol } => write!(f, "{}:{}", path.display(), symbol),
            Self::Program(path) => write!(f, "{}", path.display()),
        }
    }
}

// ── dry run ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    entry_point: &'a str,
    code: i32,
}

#[derive(Debug, Serialize)]
struct DryRunReport {
    entry_point: String,
    nul_policy: NulPolicy,
    argc: i32,
    /// One entry per slot; the sentinel is `null`.
    slots: Vec<Option<String>>,
}

impl DryRunReport {
    fn new(target: &Target, policy: NulPolicy, argv: &NativeArgv) -> Self {
        let mut slots: Vec<Option<String>> = argv
            .iter()
            .map(|buffer| Some(String::from_utf8_lossy(buffer.as_bytes()).into_owned()))
            .collect();
        if argv.is_terminated() {
            slots.push(None);
        }
        Self {
            entry_point: target.to_string(),
            nul_policy: policy,
            argc: argv.argc(),
            slots,
        }
    }
}

/// Marshal exactly as a real run would, print the vector, invoke nothing.
fn dry_run(
    target: &Target,
    arguments: &ArgumentList,
    policy: NulPolicy,
    output: &OutputManager,
) -> CliResult<()> {
    let argv = NativeArgv::marshal(arguments, policy).map_err(TagrunError::from)?;
    let report = DryRunReport::new(target, policy, &argv);

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    output.header(&format!("argv for {}", report.entry_point))?;
    output.print(&format!("  argc = {}", report.argc))?;
    for (i, buffer) in argv.iter().enumerate() {
        let text = String::from_utf8_lossy(buffer.as_bytes());
        output.print(&format!(
            "  [{i}] \"{}\\0\" ({} bytes)",
            text.escape_debug(),
            buffer.as_bytes_with_nul().len()
        ))?;
        if let Some(position) = buffer.as_bytes().iter().position(|&b| b == 0) {
            output.warning(&format!(
                "argument {i} contains NUL at byte {position}; the callee sees it truncated"
            ))?;
        }
    }
    output.print(&format!("  [{}] NULL", argv.len()))?;
    Ok(())
}
