//! Command implementations for tempest-language-server subcommands.
//!
//! Each module corresponds to a top-level subcommand exposed by the CLI.

pub mod analyze;
pub mod config_cmd;
pub mod serve;
