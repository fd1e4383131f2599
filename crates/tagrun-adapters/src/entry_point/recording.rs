//! Recording entry point for testing.

use std::ffi::CStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tagrun_core::{application::ports::EntryPoint, domain::NativeArgv};

/// One call as the callee saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub argc: i32,
    /// Pointer slots, sentinel included.
    pub slot_count: usize,
    /// Each argument read through its pointer up to the first NUL.
    pub args: Vec<Vec<u8>>,
    /// Whether `argv[argc]` was null.
    pub sentinel_is_null: bool,
}

impl RecordedCall {
    /// Arguments as lossy UTF-8, for assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect()
    }
}

/// Entry point that reads `argv` like a C `main` and remembers what it saw.
///
/// Clones share the same log, so a test can keep one handle and give the
/// other to the service.
#[derive(Debug, Clone)]
pub struct RecordingEntryPoint {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    code: i32,
    reentrant: bool,
}

impl RecordingEntryPoint {
    /// Create a recorder that returns 0.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            code: 0,
            reentrant: false,
        }
    }

    /// Return `code` from every call.
    pub fn returning(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    pub fn reentrant(mut self, reentrant: bool) -> Self {
        self.reentrant = reentrant;
        self
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecordingEntryPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPoint for RecordingEntryPoint {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    fn invoke(&self, argv: &mut NativeArgv) -> i32 {
        let argc = argv.argc();
        let table = argv.as_ptr();
        let count = usize::try_from(argc).unwrap_or(0);

        let mut args = Vec::with_capacity(count);
        // SAFETY: NativeArgv guarantees `argc` valid NUL-terminated pointers
        // followed by one more slot, all alive for this borrow.
        let sentinel_is_null = unsafe {
            for i in 0..count {
                args.push(CStr::from_ptr(*table.add(i)).to_bytes().to_vec());
            }
            (*table.add(count)).is_null()
        };

        self.lock().push(RecordedCall {
            argc,
            slot_count: argv.slot_count(),
            args,
            sentinel_is_null,
        });
        self.code
    }
}
