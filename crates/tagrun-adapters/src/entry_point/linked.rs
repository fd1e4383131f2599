//! Entry point linked into the binary.

use std::ffi::{c_char, c_int};
use std::fmt;

use tagrun_core::{application::ports::EntryPoint, domain::NativeArgv};

/// Signature of a C `main(int argc, char **argv)`.
pub type MainFn = unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int;

/// A `main`-like function resolved at link time, e.g. a tagging tool built
/// as a static library with its `main` renamed.
pub struct LinkedEntryPoint {
    name: String,
    main: MainFn,
    reentrant: bool,
}

impl LinkedEntryPoint {
    /// Wrap `main`.
    ///
    /// # Safety
    ///
    /// `main` must behave like a C `main`: read at most `argc` arguments plus
    /// the null sentinel, never free or retain the vector after returning,
    /// and return normally.
    pub unsafe fn new(name: impl Into<String>, main: MainFn) -> Self {
        Self {
            name: name.into(),
            main,
            reentrant: false,
        }
    }

    /// Let calls bypass the invocation lock.
    ///
    /// # Safety
    ///
    /// `main` must be safe to run concurrently with itself: no unsynchronised
    /// global state.
    pub unsafe fn assume_reentrant(mut self) -> Self {
        self.reentrant = true;
        self
    }
}

impl fmt::Debug for LinkedEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedEntryPoint")
            .field("name", &self.name)
            .field("reentrant", &self.reentrant)
            .finish_non_exhaustive()
    }
}

impl EntryPoint for LinkedEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    fn invoke(&self, argv: &mut NativeArgv) -> i32 {
        // SAFETY: the constructor's contract covers `main`; `argv` holds
        // `argc` NUL-terminated buffers and a null sentinel, and outlives
        // the call.
        unsafe { (self.main)(argv.argc(), argv.as_mut_ptr()) }
    }
}
