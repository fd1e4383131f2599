//! Entry point backed by an external program.
//!
//! Each call spawns one process, so the adapter is reentrant. The marshaled
//! vector is translated back into process arguments exactly as a C callee
//! would read it: `argv[0]` becomes the process's `arg0` (on Unix) and every
//! argument ends at its first NUL byte.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus as ProcessStatus};

use tracing::{debug, error};

use tagrun_core::{application::ports::EntryPoint, domain::NativeArgv};

/// Program run when none is configured; resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "ctags";

/// Returned when the program cannot be started, as a shell would.
const SPAWN_FAILED: i32 = 127;

/// Offset added to a terminating signal number, as a shell would.
#[cfg(unix)]
const SIGNAL_BASE: i32 = 128;

/// Runs `program` once per invocation and returns its exit code.
///
/// A process always receives an `argv[0]`. With zero marshaled arguments
/// the operating system fills it with the program path, so the program sees
/// a count of 1 where a linked or loaded `main` would see 0.
#[derive(Debug, Clone)]
pub struct CommandEntryPoint {
    name: String,
    program: PathBuf,
}

impl CommandEntryPoint {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            name: program.display().to_string(),
            program,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, argv: &NativeArgv) -> Command {
        let mut command = Command::new(&self.program);
        let mut args = argv.iter().map(|buffer| c_view(buffer.as_bytes()));

        if let Some(arg0) = args.next() {
            set_arg0(&mut command, arg0);
        }
        command.args(args);
        command
    }
}

impl Default for CommandEntryPoint {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl EntryPoint for CommandEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn invoke(&self, argv: &mut NativeArgv) -> i32 {
        debug!(program = %self.name, argc = argv.argc(), "Spawning program");
        match self.command(argv).status() {
            Ok(status) => status_code(status),
            Err(e) => {
                error!(program = %self.name, error = %e, "Failed to start program");
                SPAWN_FAILED
            }
        }
    }
}

/// The bytes a C callee would see: everything before the first NUL.
fn c_view(bytes: &[u8]) -> OsString {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    to_os_string(&bytes[..end])
}

#[cfg(unix)]
fn to_os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes.to_vec())
}

#[cfg(not(unix))]
fn to_os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(unix)]
fn set_arg0(command: &mut Command, arg0: OsString) {
    use std::os::unix::process::CommandExt;
    command.arg0(arg0);
}

// No way to override argv[0] here; the program path stands in for it.
#[cfg(not(unix))]
fn set_arg0(_command: &mut Command, _arg0: OsString) {}

fn status_code(status: ProcessStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_BASE + signal;
        }
    }
    SPAWN_FAILED
}
