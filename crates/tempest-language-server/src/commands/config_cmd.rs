//! `config` subcommand: show resolved configuration.
//!
//! Prints the merged configuration either as JSON (`--json`) or as a
//! key = value table followed by the files it came from.

use crate::cli::ConfigArgs;
use crate::config::{ResolvedConfig, resolve_config};
use std::path::PathBuf;

/// Run the `config` subcommand.
///
/// # Errors
///
/// Returns an error if config resolution fails (unreadable or invalid TOML,
/// or no home directory).
pub async fn run(config_path: &Option<PathBuf>, args: ConfigArgs) -> anyhow::Result<()> {
    let resolved: ResolvedConfig = resolve_config(config_path.as_deref())?;
    let cfg = &resolved.server;

    if args.json {
        println!("{}", serde_json::to_string_pretty(cfg)?);
        return Ok(());
    }

    println!("tempest-language-server configuration:");
    println!("  language_ids     = {}", cfg.language_ids.join(", "));
    println!("  log_parse_tree   = {}", cfg.log_parse_tree);
    println!("  report_to_client = {}", cfg.report_to_client);
    println!("  view_namespace   = {}", cfg.view_namespace);
    println!("  view_function    = {}", cfg.view_function);

    if resolved.sources.is_empty() {
        println!("  sources          = (defaults)");
    } else {
        println!("  sources:");
        for source in &resolved.sources {
            println!("    {}", source.display());
        }
    }
    Ok(())
}
