//! Command trait definition for CLI commands.
//!
//! This module defines the [`Command`] trait that all kmerpack CLI commands implement.
//! The trait uses `enum_dispatch` for efficient dynamic dispatch across command variants.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// Trait implemented by all kmerpack CLI commands.
///
/// `command_line` is the full invocation, logged once at startup of each command.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
