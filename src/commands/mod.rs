//! Command module - Strategy pattern for the two CLI modes.
//!
//! Each command holds its immutable configuration and implements
//! `CommandExecutor`.

mod decode;
mod encode;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use anyhow::Result;

/// Trait for command execution - Strategy pattern.
pub trait CommandExecutor {
    /// Executes the command with its configuration.
    fn execute(&self) -> Result<()>;
}
