//! Infrastructure adapters for tagrun.
//!
//! This crate implements the `EntryPoint` port defined in
//! `tagrun-core::application::ports`. All foreign calls, library loading and
//! process spawning live here.

pub mod entry_point;

// Re-export commonly used adapters
pub use entry_point::{
    CommandEntryPoint, DEFAULT_PROGRAM, DEFAULT_SYMBOL, DynamicEntryPoint, LinkedEntryPoint,
    MainFn, RecordedCall, RecordingEntryPoint,
};
