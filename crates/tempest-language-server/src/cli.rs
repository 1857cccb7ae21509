//! CLI argument types for tempest-language-server.
//!
//! Running without a subcommand is the same as `serve`, which is how editors
//! launch the server.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Language server for PHP projects built on the Tempest framework
#[derive(Parser, Debug)]
#[command(name = "tempest-language-server", version, about)]
pub struct Cli {
    /// Path to a config file (default: .tempest-lsp.toml, then the global file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Communicate over stdin/stdout (the only transport; accepted for editor compatibility)
    #[arg(long, global = true)]
    pub stdio: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the language server on stdin/stdout
    Serve(ServeArgs),
    /// Show resolved configuration
    Config(ConfigArgs),
    /// Run the view analysis on a PHP file and print the report
    Analyze(AnalyzeArgs),
}

/// Arguments for the `serve` subcommand
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Log the parse tree of every registered document
    #[arg(long)]
    pub log_parse_tree: bool,

    /// Accept documents with this language id (repeatable; replaces the configured list)
    #[arg(long = "language-id", value_name = "ID")]
    pub language_ids: Vec<String>,

    /// Keep view analysis reports out of the editor log
    #[arg(long)]
    pub no_report: bool,
}

/// Arguments for the `config` subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `analyze` subcommand
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// PHP file to analyze
    pub file: PathBuf,

    /// Output the analysis result as JSON
    #[arg(long)]
    pub json: bool,
}
