//! Entry point resolved from a shared library at runtime.

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, instrument};

use tagrun_core::{
    application::{ApplicationError, ports::EntryPoint},
    domain::NativeArgv,
    error::TagrunResult,
};

use super::linked::MainFn;

/// Symbol looked up when none is configured.
pub const DEFAULT_SYMBOL: &str = "main";

/// A `main`-like symbol exported by a shared library (`libctags.so`,
/// `ctags.dll`, ...).
///
/// The library stays loaded for as long as the adapter lives; the resolved
/// function pointer is only used while `library` is alive.
pub struct DynamicEntryPoint {
    name: String,
    path: PathBuf,
    main: MainFn,
    // Declared last so it is dropped after everything that could refer into it.
    _library: Library,
}

impl DynamicEntryPoint {
    /// Load `path` and resolve `symbol`.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers, and `symbol` must really be a
    /// function with the [`MainFn`] signature that honours the same contract
    /// as [`LinkedEntryPoint::new`](super::LinkedEntryPoint::new).
    #[instrument(skip_all, fields(path = %path.as_ref().display(), symbol = %symbol))]
    pub unsafe fn load(path: impl AsRef<Path>, symbol: &str) -> TagrunResult<Self> {
        let path = path.as_ref();
        let name = format!("{}:{}", path.display(), symbol);

        // SAFETY: forwarded to the caller.
        let library = unsafe { Library::new(path) }.map_err(|e| unavailable(&name, e))?;
        debug!("Library loaded");

        // SAFETY: forwarded to the caller; the pointer is copied out and only
        // used while `library` is kept alive in the same struct.
        let main: MainFn = unsafe {
            *library
                .get::<MainFn>(symbol.as_bytes())
                .map_err(|e| unavailable(&name, e))?
        };
        info!("Entry point resolved");

        Ok(Self {
            name,
            path: path.to_path_buf(),
            main,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unavailable(name: &str, err: libloading::Error) -> ApplicationError {
    ApplicationError::EntryPointUnavailable {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

impl fmt::Debug for DynamicEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicEntryPoint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl EntryPoint for DynamicEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, argv: &mut NativeArgv) -> i32 {
        // SAFETY: see `load`; `_library` is alive for as long as `self`.
        unsafe { (self.main)(argv.argc(), argv.as_mut_ptr()) }
    }
}
