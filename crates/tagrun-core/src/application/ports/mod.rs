//! Application ports (traits) for external dependencies.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `EntryPoint`: the external program's `main(argc, argv)`
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `MarshalService::run`, used by the CLI host

pub mod output;

pub use output::EntryPoint;
