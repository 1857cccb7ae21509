//! `serve` subcommand: run the language server on stdin/stdout.
//!
//! See [`crate::server`] for the message handling and [`crate::framing`] for
//! the wire format.

use crate::cli::ServeArgs;
use crate::config::{ServerConfig, resolve_config};
use std::path::PathBuf;

/// Run the `serve` subcommand.
///
/// Returns `true` if the client sent `shutdown` before the stream ended.
///
/// # Errors
///
/// Returns an error if configuration resolution fails or the input stream
/// breaks the framing rules.
pub async fn run(config_path: &Option<PathBuf>, args: ServeArgs) -> anyhow::Result<bool> {
    let resolved = resolve_config(config_path.as_deref())?;
    for source in &resolved.sources {
        tracing::debug!(path = %source.display(), "loaded config");
    }

    let config = apply_overrides(resolved.server, args);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        languages = ?config.language_ids,
        "starting tempest-language-server"
    );

    crate::server::run(config, tokio::io::stdin(), tokio::io::stdout()).await
}

fn apply_overrides(mut config: ServerConfig, args: ServeArgs) -> ServerConfig {
    if args.log_parse_tree {
        config.log_parse_tree = true;
    }
    if !args.language_ids.is_empty() {
        config.language_ids = args.language_ids;
    }
    if args.no_report {
        config.report_to_client = false;
    }
    config
}
