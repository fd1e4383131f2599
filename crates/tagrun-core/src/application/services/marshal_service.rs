//! Marshal Service - the argument marshaler.
//!
//! One call of [`MarshalService::run`] is:
//! 1. Marshal the arguments into a fresh [`NativeArgv`]
//! 2. Take the process-wide invocation lock (unless the entry point is reentrant)
//! 3. Invoke the entry point once with the real `argc`
//! 4. Drop the vector and return the entry point's integer untouched
//!
//! Marshaling errors surface in step 1, so the entry point is never called
//! with a partial vector.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::ports::EntryPoint,
    domain::{Argument, ArgumentList, ExitStatus, NativeArgv, NulPolicy},
    error::TagrunResult,
};

/// Serializes every non-reentrant invocation in the process.
///
/// Guards no data: it only exists so two calls into a `main` with global state
/// never overlap.
static INVOCATION_LOCK: Mutex<()> = Mutex::new(());

/// Main marshaling service.
pub struct MarshalService {
    entry_point: Box<dyn EntryPoint>,
    nul_policy: NulPolicy,
}

impl MarshalService {
    /// Create a service around an entry point adapter.
    pub fn new(entry_point: Box<dyn EntryPoint>) -> Self {
        Self {
            entry_point,
            nul_policy: NulPolicy::default(),
        }
    }

    pub fn with_nul_policy(mut self, nul_policy: NulPolicy) -> Self {
        self.nul_policy = nul_policy;
        self
    }

    pub fn nul_policy(&self) -> NulPolicy {
        self.nul_policy
    }

    pub fn entry_point_name(&self) -> &str {
        self.entry_point.name()
    }

    /// Marshal `args`, invoke the entry point once, and return its status.
    ///
    /// This is the operation exposed to the host: a sequence of strings in,
    /// an integer out. `Err` means the entry point was not invoked.
    #[instrument(skip_all, fields(entry_point = %self.entry_point.name()))]
    pub fn run<I, A>(&self, args: I) -> TagrunResult<ExitStatus>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let args: ArgumentList = args.into_iter().collect();
        let argv = self.prepare(&args)?;
        let status = self.invoke(argv);

        info!(code = status.code(), "Entry point returned");
        Ok(status)
    }

    /// Marshal without invoking.
    pub fn prepare(&self, args: &ArgumentList) -> TagrunResult<NativeArgv> {
        let argv = NativeArgv::marshal(args, self.nul_policy)?;
        debug!(
            argc = argv.argc(),
            slots = argv.slot_count(),
            policy = %self.nul_policy,
            "Arguments marshaled"
        );
        Ok(argv)
    }

    /// Invoke the entry point with a vector from [`Self::prepare`].
    ///
    /// Takes the vector by value and drops it once the entry point returns:
    /// the callee may have permuted its pointer table, so a vector is only
    /// ever handed out once.
    ///
    /// ```compile_fail
    /// use tagrun_core::prelude::*;
    ///
    /// struct Count;
    ///
    /// impl EntryPoint for Count {
    ///     fn name(&self) -> &str {
    ///         "count"
    ///     }
    ///
    ///     fn invoke(&self, argv: &mut NativeArgv) -> i32 {
    ///         argv.argc()
    ///     }
    /// }
    ///
    /// let service = MarshalService::new(Box::new(Count));
    /// let args: ArgumentList = ["ctags", "-R"].into_iter().collect();
    /// let argv = service.prepare(&args).unwrap();
    /// service.invoke(argv);
    /// service.invoke(argv);
    /// ```
    pub fn invoke(&self, mut argv: NativeArgv) -> ExitStatus {
        invoke_with(self.entry_point.as_ref(), &mut argv)
    }
}

/// Invoke `entry_point` under the invocation lock when it needs one.
pub(crate) fn invoke_with(entry_point: &dyn EntryPoint, argv: &mut NativeArgv) -> ExitStatus {
    let _guard = (!entry_point.is_reentrant()).then(acquire_invocation_lock);

    debug!(argc = argv.argc(), "Invoking entry point");
    ExitStatus::new(entry_point.invoke(argv))
}

fn acquire_invocation_lock() -> MutexGuard<'static, ()> {
    INVOCATION_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("A previous invocation panicked; continuing");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::application::ports::output::MockEntryPoint;
    use crate::domain::DomainError;
    use crate::error::TagrunError;

    fn mock_named() -> MockEntryPoint {
        let mut mock = MockEntryPoint::new();
        mock.expect_name().return_const("mock".to_owned());
        mock
    }

    #[test]
    fn run_passes_real_count_and_returns_code_verbatim() {
        let mut mock = mock_named();
        mock.expect_is_reentrant().return_const(false);
        mock.expect_invoke().times(1).returning(|argv| {
            assert_eq!(argv.argc(), 3);
            assert_eq!(argv.slot_count(), 4);
            assert!(argv.is_terminated());
            assert_eq!(argv.buffer(0).unwrap().as_bytes_with_nul(), b"tagfile\0");
            assert_eq!(argv.buffer(1).unwrap().as_bytes_with_nul(), b"--options\0");
            assert_eq!(argv.buffer(2).unwrap().as_bytes_with_nul(), b"src/\0");
            -7
        });

        let service = MarshalService::new(Box::new(mock));
        let status = service.run(["tagfile", "--options", "src/"]).unwrap();

        assert_eq!(status.code(), -7);
    }

    #[test]
    fn run_with_no_arguments_still_invokes() {
        let mut mock = mock_named();
        mock.expect_is_reentrant().return_const(false);
        mock.expect_invoke().times(1).returning(|argv| {
            assert_eq!(argv.argc(), 0);
            assert_eq!(argv.slot_count(), 1);
            0
        });

        let service = MarshalService::new(Box::new(mock));
        let status = service.run(Vec::<String>::new()).unwrap();

        assert!(status.success());
    }

    #[test]
    fn marshaling_error_never_reaches_entry_point() {
        let mut mock = mock_named();
        mock.expect_is_reentrant().return_const(false);
        mock.expect_invoke().never();

        let service = MarshalService::new(Box::new(mock)).with_nul_policy(NulPolicy::Reject);
        let err = service
            .run([Argument::from("ctags"), Argument::from_bytes(b"a\0b".to_vec())])
            .unwrap_err();

        assert_eq!(
            err,
            TagrunError::Domain(DomainError::InteriorNul {
                index: 1,
                position: 1
            })
        );
    }

    #[test]
    fn preserve_policy_forwards_interior_nul() {
        let mut mock = mock_named();
        mock.expect_is_reentrant().return_const(false);
        mock.expect_invoke().times(1).returning(|argv| {
            assert_eq!(argv.buffer(0).unwrap().as_bytes_with_nul(), b"a\0b\0");
            1
        });

        let service = MarshalService::new(Box::new(mock));
        assert_eq!(service.nul_policy(), NulPolicy::Preserve);
        let status = service
            .run([Argument::from_bytes(b"a\0b".to_vec())])
            .unwrap();
        assert_eq!(status.code(), 1);
    }

    #[test]
    fn prepare_then_invoke_matches_run() {
        let mut mock = mock_named();
        mock.expect_is_reentrant().return_const(true);
        mock.expect_invoke().times(1).returning(|argv| argv.argc() * 10);

        let service = MarshalService::new(Box::new(mock));
        let args: ArgumentList = ["a", "b"].into_iter().collect();
        let argv = service.prepare(&args).unwrap();

        assert_eq!(service.invoke(argv).code(), 20);
    }

    /// Reverses the table like an argument-permuting `main` and reports the
    /// `argv[0]` it ends up with.
    struct Reversing {
        first_seen: Mutex<Vec<Vec<u8>>>,
    }

    impl EntryPoint for Arc<Reversing> {
        fn name(&self) -> &str {
            "reversing"
        }

        fn invoke(&self, argv: &mut NativeArgv) -> i32 {
            let argc = argv.argc() as usize;
            // SAFETY: the table holds argc valid pointers before the sentinel.
            let table = unsafe { std::slice::from_raw_parts_mut(argv.as_mut_ptr(), argc) };
            let seen = table.first().map(|p| unsafe { CStr::from_ptr(*p) }.to_bytes().to_vec());
            table.reverse();
            if let Some(seen) = seen {
                self.first_seen.lock().unwrap().push(seen);
            }
            0
        }
    }

    #[test]
    fn every_invocation_gets_an_unpermuted_vector() {
        let reversing = Arc::new(Reversing {
            first_seen: Mutex::new(Vec::new()),
        });
        let service = MarshalService::new(Box::new(Arc::clone(&reversing)));
        let args: ArgumentList = ["ctags", "-R", "src"].into_iter().collect();

        for _ in 0..2 {
            let argv = service.prepare(&args).unwrap();
            service.invoke(argv);
        }
        service.run(["ctags", "-R", "src"]).unwrap();

        let seen = reversing.first_seen.lock().unwrap();
        assert_eq!(*seen, vec![b"ctags".to_vec(); 3]);
    }

    // mockall serializes calls on its own expectation lock, so overlap is
    // measured with a plain struct instead.
    #[derive(Default)]
    struct Counting {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
        calls: AtomicUsize,
    }

    impl EntryPoint for Arc<Counting> {
        fn name(&self) -> &str {
            "counting"
        }

        fn invoke(&self, _argv: &mut NativeArgv) -> i32 {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[test]
    fn non_reentrant_calls_never_overlap() {
        let counting = Arc::new(Counting::default());
        let service = MarshalService::new(Box::new(Arc::clone(&counting)));

        thread::scope(|s| {
            for i in 0..8 {
                let service = &service;
                s.spawn(move || service.run([format!("call-{i}")]).unwrap());
            }
        });

        assert_eq!(counting.calls.load(Ordering::SeqCst), 8);
        assert_eq!(counting.max_seen.load(Ordering::SeqCst), 1);
    }

    struct Exploding;

    impl EntryPoint for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn invoke(&self, _argv: &mut NativeArgv) -> i32 {
            panic!("entry point blew up")
        }
    }

    #[test]
    fn panicking_entry_point_does_not_wedge_later_calls() {
        let service = MarshalService::new(Box::new(Exploding));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| service.run(["x"])));
        assert!(outcome.is_err());

        let mut healthy = mock_named();
        healthy.expect_is_reentrant().return_const(false);
        healthy.expect_invoke().times(1).return_const(0);
        let service = MarshalService::new(Box::new(healthy));

        assert!(service.run(["y"]).unwrap().success());
    }
}
