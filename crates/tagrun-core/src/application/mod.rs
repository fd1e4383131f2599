//! Application layer for tagrun.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (MarshalService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer; the marshaling rules
//! themselves live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::MarshalService;

// Re-export port traits (for adapter implementation)
pub use ports::EntryPoint;

pub use error::ApplicationError;
