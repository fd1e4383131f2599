//! Application services - orchestrate use cases.

pub mod marshal_service;

pub use marshal_service::MarshalService;
