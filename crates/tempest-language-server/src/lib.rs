//! tempest-language-server library crate.
//!
//! Provides the LSP server core, framing, configuration and CLI types for the
//! `tempest-language-server` binary. Exposed as a library for integration
//! testing.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod document;
pub mod framing;
pub mod logging;
pub mod protocol;
pub mod server;

#[doc(inline)]
pub use server::{TempestLanguageServer, run};
