//! The one error type the core crate returns to hosts.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Returned only when marshaling or setup fails. A completed invocation is
/// always `Ok`, whatever integer the entry point produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagrunError {
    #[error("Marshaling error: {0}")]
    Domain(#[from] DomainError),

    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),
}

impl TagrunError {
    /// Hints a host can show next to the message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Resource => ErrorCategory::Resource,
            },
            Self::Application(e) => e.category(),
        }
    }

    /// An allocation refused under memory pressure may succeed later; nothing
    /// else changes between attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Domain(DomainError::AllocationFailed { .. }))
    }
}

/// What kind of failure, independent of which layer raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Resource,
    NotFound,
}

pub type TagrunResult<T> = Result<T, TagrunError>;
