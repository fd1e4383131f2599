//! Domain and application layers of tagrun.
//!
//! tagrun copies host strings into NUL-terminated buffers, builds a
//! null-terminated `argv` over them and hands `argc`/`argv` to a tagging
//! tool's native `main`. Nothing here knows how that `main` is reached; the
//! [`EntryPoint`](application::ports::EntryPoint) port is implemented in
//! `tagrun-adapters`.
//!
//! ```text
//!   host (tagrun-cli, tests)
//!        │ MarshalService::run / tagrun_core::run
//!        ▼
//!   domain::NativeArgv::marshal ──► EntryPoint::invoke (port)
//!        │                              ▲
//!        │ dropped after the call       │ tagrun-adapters:
//!        ▼                              │ linked, dynamic, command, recording
//!   ExitStatus returned unchanged
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagrun_core::application::MarshalService;
//!
//! // `entry_point` is any `impl EntryPoint` from tagrun-adapters.
//! let service = MarshalService::new(entry_point);
//! let status = service.run(["ctags", "-R", "src/"]).unwrap();
//! std::process::exit(status.code());
//! ```
//!
//! ## Limitations
//!
//! There is no timeout or cancellation. An entry point that never returns
//! blocks its caller, and every other caller queued on the invocation lock,
//! indefinitely.

pub mod application;
pub mod domain;
pub mod error;

use crate::{
    application::{ports::EntryPoint, services::marshal_service},
    domain::{Argument, ArgumentList, ExitStatus, NativeArgv, NulPolicy},
    error::TagrunResult,
};

/// Marshal `args`, invoke `entry_point` once, and return its status.
///
/// Stateless convenience for hosts that do not keep a [`MarshalService`]
/// around. Uses the default [`NulPolicy`].
///
/// [`MarshalService`]: application::MarshalService
pub fn run<I, A>(entry_point: &dyn EntryPoint, args: I) -> TagrunResult<ExitStatus>
where
    I: IntoIterator<Item = A>,
    A: Into<Argument>,
{
    let args: ArgumentList = args.into_iter().collect();
    let mut argv = NativeArgv::marshal(&args, NulPolicy::default())?;
    Ok(marshal_service::invoke_with(entry_point, &mut argv))
}

/// Everything a host needs to marshal and invoke.
pub mod prelude {
    pub use crate::application::{MarshalService, ports::EntryPoint};
    pub use crate::domain::{
        Argument, ArgumentList, ExitStatus, NativeArgv, NativeBuffer, NulPolicy,
    };
    pub use crate::error::{TagrunError, TagrunResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
