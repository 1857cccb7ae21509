//! `analyze` subcommand: run the view analysis on a file from disk.
//!
//! Prints the same report lines the server sends to the editor, or the raw
//! analysis result with `--json`.

use crate::cli::AnalyzeArgs;
use crate::config::resolve_config;
use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;
use tempest_php_parser::PhpParser;
use tempest_view_intelligence::{ViewAnalysisReport, ViewIntelligence};

/// Run the `analyze` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be resolved, the file cannot be read,
/// or the parser fails.
pub async fn run(config_path: &Option<PathBuf>, args: AnalyzeArgs) -> anyhow::Result<()> {
    let resolved = resolve_config(config_path.as_deref())?;
    let target = resolved.server.view_target();

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let parser = PhpParser::new()?;
    let tree = parser
        .parse(&text, None)
        .with_context(|| format!("could not parse {}", args.file.display()))?;
    if tree.root_node().has_error() {
        tracing::warn!(file = %args.file.display(), "syntax errors in file; results may be partial");
    }

    let result = ViewIntelligence::analyze(&tree, &text, &target)?;
    let name = args.file.display().to_string();

    if args.json {
        let output = json!({
            "file": name,
            "target": target.fully_qualified_name(),
            "imports": result.imports,
            "calls": result.calls,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let lines = ViewAnalysisReport::lines(&result, &name);
    if lines.is_empty() {
        println!("No {} usage in {name}", target.fully_qualified_name());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
