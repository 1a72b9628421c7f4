//! Intent executors: OS-level actions for each command
//!
//! Thin wrappers over platform navigation. The launcher trait is the
//! seam for tests and alternative platforms.

mod dispatch;
mod launcher;

pub use dispatch::{Dispatch, ExecError, Executor};
pub use launcher::{LaunchError, OsLauncher, UriLauncher};
