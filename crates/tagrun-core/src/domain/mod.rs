//! Core domain layer for tagrun.
//!
//! Pure marshaling logic. Nothing here calls into foreign code; the only
//! `unsafe`-adjacent concern is that [`NativeArgv`] hands out raw pointers,
//! and it owns everything those pointers refer to.
//!
//! - **No I/O**: building a vector never touches the filesystem or a process
//! - **Fallible allocation**: every buffer is reserved with `try_reserve_exact`
//! - **RAII release**: dropping a [`NativeArgv`] frees every buffer
pub mod argument;
pub mod error;
pub mod exit_status;
pub mod native_argv;
pub mod value_objects;

pub use argument::{Argument, ArgumentList};
pub use error::{Allocation, DomainError, ErrorCategory};
pub use exit_status::ExitStatus;
pub use native_argv::{NativeArgv, NativeBuffer};
pub use value_objects::{NulPolicy, UnknownNulPolicy};

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    fn marshal(values: &[&str]) -> NativeArgv {
        let args: ArgumentList = values.iter().copied().collect();
        NativeArgv::marshal(&args, NulPolicy::Preserve).unwrap()
    }

    // ========================================================================
    // Slot layout
    // ========================================================================

    #[test]
    fn slot_count_is_argument_count_plus_sentinel() {
        for n in 0..8 {
            let values: Vec<String> = (0..n).map(|i| format!("arg{i}")).collect();
            let args: ArgumentList = values.iter().collect();
            let argv = NativeArgv::marshal(&args, NulPolicy::Preserve).unwrap();

            assert_eq!(argv.len(), n);
            assert_eq!(argv.slot_count(), n + 1);
            assert_eq!(argv.argc() as usize, n);
            assert!(argv.is_terminated());
        }
    }

    #[test]
    fn empty_list_is_only_the_sentinel() {
        let argv = marshal(&[]);
        assert_eq!(argv.slot_count(), 1);
        assert_eq!(argv.argc(), 0);
        assert!(argv.slots()[0].is_null());
    }

    #[test]
    fn tagfile_scenario_layout() {
        let argv = marshal(&["tagfile", "--options", "src/"]);

        assert_eq!(argv.argc(), 3);
        assert_eq!(argv.slot_count(), 4);
        assert_eq!(argv.buffer(0).unwrap().as_bytes_with_nul(), b"tagfile\0");
        assert_eq!(argv.buffer(1).unwrap().as_bytes_with_nul(), b"--options\0");
        assert_eq!(argv.buffer(2).unwrap().as_bytes_with_nul(), b"src/\0");
        assert!(argv.slots()[3].is_null());
    }

    #[test]
    fn slots_point_at_their_buffers() {
        let argv = marshal(&["a", "bb", "ccc"]);
        for (slot, buffer) in argv.slots().iter().zip(argv.iter()) {
            assert_eq!(*slot as *const u8, buffer.as_bytes_with_nul().as_ptr());
            // SAFETY: slot points at a NUL-terminated buffer owned by `argv`.
            let seen = unsafe { CStr::from_ptr(*slot) };
            assert_eq!(seen.to_bytes(), buffer.as_bytes());
        }
    }

    // ========================================================================
    // Buffer contents
    // ========================================================================

    #[test]
    fn buffers_are_exact_copies_plus_one_terminator() {
        let values = ["", "plain", "héllo wörld", "日本語", "tab\tand space"];
        let argv = marshal(&values);

        for (value, buffer) in values.iter().zip(argv.iter()) {
            let bytes = buffer.as_bytes_with_nul();
            assert_eq!(bytes.len(), value.len() + 1);
            assert_eq!(&bytes[..value.len()], value.as_bytes());
            assert_eq!(bytes[value.len()], 0);
        }
    }

    #[test]
    fn long_argument_is_not_truncated() {
        let long = "x".repeat(500);
        let argv = marshal(&[long.as_str()]);
        let buffer = argv.buffer(0).unwrap();

        assert_eq!(buffer.len(), 500);
        assert_eq!(buffer.as_bytes_with_nul().len(), 501);
        assert_eq!(buffer.as_bytes(), long.as_bytes());
    }

    #[test]
    fn very_long_argument_is_sized_from_source() {
        let long = "--regex-c=/".repeat(10_000);
        let argv = marshal(&[long.as_str()]);
        assert_eq!(argv.buffer(0).unwrap().len(), long.len());
    }

    // ========================================================================
    // Interior NUL handling
    // ========================================================================

    #[test]
    fn preserve_keeps_interior_nul_bytes() {
        let args = ArgumentList::from_iter([Argument::from_bytes(b"ab\0cd".to_vec())]);
        let argv = NativeArgv::marshal(&args, NulPolicy::Preserve).unwrap();

        assert_eq!(argv.buffer(0).unwrap().as_bytes_with_nul(), b"ab\0cd\0");
        assert_eq!(argv.argc(), 1);
    }

    #[test]
    fn reject_refuses_interior_nul_bytes() {
        let args = ArgumentList::from_iter([
            Argument::from("ok"),
            Argument::from_bytes(b"bad\0value".to_vec()),
        ]);
        let err = NativeArgv::marshal(&args, NulPolicy::Reject).unwrap_err();

        assert_eq!(
            err,
            DomainError::InteriorNul {
                index: 1,
                position: 3
            }
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn reject_accepts_clean_arguments() {
        let args: ArgumentList = ["ctags", "-R"].into_iter().collect();
        assert!(NativeArgv::marshal(&args, NulPolicy::Reject).is_ok());
    }

    // ========================================================================
    // Value objects
    // ========================================================================

    #[test]
    fn nul_policy_parses() {
        assert_eq!("preserve".parse::<NulPolicy>().unwrap(), NulPolicy::Preserve);
        assert_eq!("REJECT".parse::<NulPolicy>().unwrap(), NulPolicy::Reject);
        assert!("truncate".parse::<NulPolicy>().is_err());
        assert_eq!(NulPolicy::default(), NulPolicy::Preserve);
    }

    #[test]
    fn nul_policy_accepts_only_its_two_names() {
        for alias in ["keep", "deny", "strip", ""] {
            assert!(alias.parse::<NulPolicy>().is_err(), "{alias:?}");
        }
        assert_eq!(
            "Truncate".parse::<NulPolicy>().unwrap_err(),
            UnknownNulPolicy("Truncate".into())
        );
    }

    #[test]
    fn exit_status_passes_code_through() {
        assert_eq!(ExitStatus::new(3).code(), 3);
        assert!(ExitStatus::new(0).success());
        assert!(!ExitStatus::new(1).success());
        assert_eq!(ExitStatus::new(-1).shell_code(), 255);
        assert_eq!(ExitStatus::new(256).shell_code(), 0);
    }
}
