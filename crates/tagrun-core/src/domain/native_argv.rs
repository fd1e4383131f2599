//! The C-side view of an [`ArgumentList`].
//!
//! A [`NativeArgv`] owns one [`NativeBuffer`] per argument and a pointer table
//! of `len + 1` slots whose last slot is null, which is exactly what a C
//! `main(int argc, char **argv)` expects.
//!
//! # Ownership
//!
//! Buffers are freed through `buffers`, never through the pointer table. The
//! callee may permute the table (GNU `getopt` does) without affecting what
//! gets released. Nothing is leaked on any path: dropping the vector, whether
//! on return or while unwinding, drops every buffer.

use std::ffi::{c_char, c_int};
use std::fmt;
use std::ptr;

use tracing::{trace, warn};

use crate::domain::{
    argument::ArgumentList,
    error::{Allocation, DomainError},
    value_objects::NulPolicy,
};

/// Owned, NUL-terminated copy of one argument.
///
/// Always exactly `source.len() + 1` bytes long.
pub struct NativeBuffer {
    bytes: Vec<u8>,
}

impl NativeBuffer {
    /// Copy `source` into a freshly allocated buffer and append the terminator.
    ///
    /// `index` is only used to label an allocation failure.
    pub fn copy_from(index: usize, source: &[u8]) -> Result<Self, DomainError> {
        let what = Allocation::Argument { index };
        let requested = source
            .len()
            .checked_add(1)
            .ok_or(DomainError::AllocationFailed {
                what,
                requested: usize::MAX,
            })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(requested)
            .map_err(|_| DomainError::AllocationFailed { what, requested })?;
        bytes.extend_from_slice(source);
        bytes.push(0);

        Ok(Self { bytes })
    }

    /// The source bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// Source length, not counting the terminator.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_mut_ptr(&mut self) -> *mut c_char {
        self.bytes.as_mut_ptr().cast()
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeBuffer")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

/// Null-terminated argument vector for a C-style entry point.
pub struct NativeArgv {
    buffers: Vec<NativeBuffer>,
    pointers: Vec<*mut c_char>,
    argc: c_int,
}

impl NativeArgv {
    /// Build a fresh vector from `args`.
    ///
    /// Fails before anything is handed out: either every buffer is allocated
    /// and the sentinel is in place, or an error is returned and whatever was
    /// already allocated is dropped.
    pub fn marshal(args: &ArgumentList, policy: NulPolicy) -> Result<Self, DomainError> {
        let count = args.len();
        let argc = c_int::try_from(count).map_err(|_| DomainError::TooManyArguments {
            count,
            limit: c_int::MAX as usize,
        })?;
        // Cannot overflow: count <= c_int::MAX.
        let slots = count + 1;

        let mut pointers: Vec<*mut c_char> = Vec::new();
        pointers
            .try_reserve_exact(slots)
            .map_err(|_| DomainError::AllocationFailed {
                what: Allocation::PointerTable,
                requested: slots.saturating_mul(size_of::<*mut c_char>()),
            })?;

        let mut buffers: Vec<NativeBuffer> = Vec::new();
        buffers
            .try_reserve_exact(count)
            .map_err(|_| DomainError::AllocationFailed {
                what: Allocation::BufferTable,
                requested: count.saturating_mul(size_of::<NativeBuffer>()),
            })?;

        for (index, arg) in args.iter().enumerate() {
            if let Some(position) = arg.nul_position() {
                match policy {
                    NulPolicy::Reject => {
                        return Err(DomainError::InteriorNul { index, position });
                    }
                    NulPolicy::Preserve => warn!(
                        index,
                        position, "argument has an interior NUL; the callee will see it truncated"
                    ),
                }
            }

            let mut buffer = NativeBuffer::copy_from(index, arg.as_bytes())?;
            // Moving the buffer into `buffers` moves the Vec header only; the
            // heap block this pointer refers to stays put.
            pointers.push(buffer.as_mut_ptr());
            buffers.push(buffer);
        }
        pointers.push(ptr::null_mut());

        trace!(argc, slots, "argument vector marshaled");
        Ok(Self {
            buffers,
            pointers,
            argc,
        })
    }

    /// The count to pass alongside [`Self::as_mut_ptr`]. Always the real
    /// number of arguments.
    pub fn argc(&self) -> c_int {
        self.argc
    }

    /// Number of arguments (slots minus the sentinel).
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Number of pointer slots, sentinel included.
    pub fn slot_count(&self) -> usize {
        self.pointers.len()
    }

    /// The pointer table as it currently stands.
    pub fn slots(&self) -> &[*mut c_char] {
        &self.pointers
    }

    /// `true` when the last slot is the null sentinel.
    pub fn is_terminated(&self) -> bool {
        self.pointers.last().is_some_and(|p| p.is_null())
    }

    /// Argument buffer `index`, in the order the caller supplied them.
    pub fn buffer(&self, index: usize) -> Option<&NativeBuffer> {
        self.buffers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NativeBuffer> {
        self.buffers.iter()
    }

    /// Read-only pointer to the table, for callees declared with `const char **`.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr().cast()
    }

    /// Mutable pointer to the table, for callees declared with `char **`.
    ///
    /// Valid until `self` is dropped. The callee may reorder slots and write
    /// into the buffers within their lengths; it must not free anything.
    pub fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        self.pointers.as_mut_ptr()
    }
}

impl fmt::Debug for NativeArgv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeArgv")
            .field("argc", &self.argc)
            .field("buffers", &self.buffers)
            .finish()
    }
}
