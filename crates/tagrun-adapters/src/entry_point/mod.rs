//! Entry point adapters.

mod command;
mod dynamic;
mod linked;
mod recording;

pub use command::{CommandEntryPoint, DEFAULT_PROGRAM};
pub use dynamic::{DEFAULT_SYMBOL, DynamicEntryPoint};
pub use linked::{LinkedEntryPoint, MainFn};
pub use recording::{RecordedCall, RecordingEntryPoint};
