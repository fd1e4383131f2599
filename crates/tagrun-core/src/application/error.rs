//! Application layer errors.
//!
//! These errors represent failures to set up or reach an entry point.
//! Marshaling failures are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while wiring the service to an entry point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// The entry point could not be loaded or resolved.
    #[error("Entry point '{name}' is unavailable: {reason}")]
    EntryPointUnavailable { name: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EntryPointUnavailable { name, .. } => vec![
                format!("Could not reach: {}", name),
                "Check that the library or program path exists".into(),
                "Check that the symbol name matches the exported entry point".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EntryPointUnavailable { .. } => ErrorCategory::NotFound,
        }
    }
}
