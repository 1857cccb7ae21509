//! tempest-language-server: language server for Tempest PHP projects.
//!
//! # Subcommands
//!
//! - `serve`   : run the server on stdin/stdout (default)
//! - `config`  : show resolved configuration
//! - `analyze` : print the view analysis of a PHP file

use std::process::ExitCode;

use clap::Parser;

use tempest_language_server::cli::{Cli, Commands, ServeArgs};
use tempest_language_server::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Serve(ServeArgs::default()));

    match command {
        Commands::Serve(args) => {
            let clean = commands::serve::run(&cli.config, args).await?;
            Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Config(args) => {
            commands::config_cmd::run(&cli.config, args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze(args) => {
            commands::analyze::run(&cli.config, args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
