//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_validators;
pub mod output;
pub mod overrides;
