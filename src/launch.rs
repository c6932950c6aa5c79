//! Synchronous launcher for a resolved invocation.
//!
//! The launcher is the only part of the tool that touches the outside
//! world. It spawns `cargo` with the resolved arguments and environment,
//! blocks until the child exits, and reports the child's status verbatim.
//! There is no timeout, retry, or cancellation handling.

use std::process::Command;

use crate::invocation::BuildInvocation;

/// Errors while launching the toolchain.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The `cargo` process could not be spawned at all.
    #[error("failed to spawn cargo: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Run the invocation and block until the child exits.
///
/// Environment entries go through the process environment rather than a
/// shell, so values never need quoting here. Returns the child's exit code;
/// a child killed by a signal reports no code and maps to 1.
pub fn execute(invocation: &BuildInvocation) -> Result<i32, LaunchError> {
    let mut command = Command::new("cargo");
    command.args(invocation.cargo_args());
    for entry in &invocation.envs {
        command.env(entry.key, &entry.value);
    }

    tracing::debug!(args = ?invocation.cargo_args(), "spawning cargo");
    let status = command.status()?;
    Ok(status.code().unwrap_or(1))
}
