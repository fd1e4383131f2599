// ============================================================================
// domain/error.rs - MARSHALING ERRORS
// ============================================================================

use std::fmt;

use thiserror::Error;

/// What a failed allocation was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The copy of argument `index`.
    Argument { index: usize },
    /// The `argv` pointer table.
    PointerTable,
    /// The list that owns the argument buffers.
    BufferTable,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument { index } => write!(f, "argument {index}"),
            Self::PointerTable => f.write_str("the argument pointer table"),
            Self::BufferTable => f.write_str("the argument buffer table"),
        }
    }
}

/// Root domain error type.
///
/// Every variant is raised before the entry point is invoked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Covers both a refused allocation and a size that cannot be expressed
    /// (`len + 1` overflowing), which is reported with `requested == usize::MAX`.
    #[error("could not allocate {requested} bytes for {what}")]
    AllocationFailed { what: Allocation, requested: usize },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("argument {index} contains a NUL byte at offset {position}")]
    InteriorNul { index: usize, position: usize },

    #[error("{count} arguments exceed the native argument count limit of {limit}")]
    TooManyArguments { count: usize, limit: usize },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::AllocationFailed { what, requested } => vec![
                format!("Allocation of {requested} bytes for {what} was refused"),
                "Free some memory or shorten the argument, then retry".into(),
            ],
            Self::InteriorNul { index, .. } => vec![
                format!("Argument {index} cannot be represented as a C string"),
                "Remove the NUL byte, or use the 'preserve' NUL policy to forward it truncated"
                    .into(),
            ],
            Self::TooManyArguments { limit, .. } => vec![
                format!("At most {limit} arguments can be forwarded"),
                "Split the work across several invocations".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AllocationFailed { .. } => ErrorCategory::Resource,
            Self::InteriorNul { .. } | Self::TooManyArguments { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Resource,
}
