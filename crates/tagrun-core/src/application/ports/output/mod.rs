//! Driven (output) ports - implemented by infrastructure.
//!
//! The `tagrun-adapters` crate provides implementations.

use crate::domain::NativeArgv;

/// Port for a C-style program entry point.
///
/// Implemented by:
/// - `tagrun_adapters::LinkedEntryPoint` (function linked into the binary)
/// - `tagrun_adapters::DynamicEntryPoint` (symbol in a shared library)
/// - `tagrun_adapters::CommandEntryPoint` (external program, one process per call)
/// - `tagrun_adapters::RecordingEntryPoint` (testing)
///
/// ## Design Notes
///
/// - `invoke` is safe: [`NativeArgv`] guarantees `argc` slots of valid
///   NUL-terminated buffers followed by a null sentinel, so adapters hold the
///   only `unsafe` blocks
/// - The vector is borrowed mutably because C callees may permute it
/// - The return value is passed back to the caller verbatim
#[cfg_attr(test, mockall::automock)]
pub trait EntryPoint: Send + Sync {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Whether concurrent calls are known to be safe.
    ///
    /// Most CLI `main` functions keep global state, so the default is `false`
    /// and calls are serialized process-wide.
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Run the entry point once with `argv.argc()` and `argv`.
    fn invoke(&self, argv: &mut NativeArgv) -> i32;
}
