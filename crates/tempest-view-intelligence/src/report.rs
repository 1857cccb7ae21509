//! Human-readable rendering of a [`ViewAnalysisResult`].
//!
//! The language server forwards these lines to the editor's log and the
//! `analyze` command prints them, so the wording is shared.

use crate::types::{ViewAnalysisResult, ViewImportType};

pub struct ViewAnalysisReport;

impl ViewAnalysisReport {
    /// Render `result` for the document at `uri`, one informational line each.
    pub fn lines(result: &ViewAnalysisResult, uri: &str) -> Vec<String> {
        let mut lines = Vec::new();

        if !result.imports.is_empty() {
            let summary = Self::import_summary(result);
            lines.push(format!(
                "Available Tempest view functions in {uri}: {summary}"
            ));
        }

        for call in &result.calls {
            let import_type = result
                .import_type_of(call)
                .map(ViewImportType::description)
                .unwrap_or("unknown");

            lines.push(format!(
                "Found Tempest view call - name: '{}', type: {import_type}, line: {}, text: '{}'",
                call.function_name, call.line, call.text
            ));

            if call.parameters.is_empty() {
                lines.push("  No parameters found".to_string());
            }

            for (i, param) in call.parameters.iter().enumerate() {
                let param_info = match &param.name {
                    Some(name) => format!("named parameter '{name}' = {}", param.value),
                    None => format!("positional parameter [{i}] = {}", param.value),
                };
                lines.push(format!(
                    "  Parameter: {param_info} (raw: '{}')",
                    param.raw_text
                ));
            }
        }

        if result.call_count() > 0 {
            lines.push(Self::call_summary(result));
        }

        lines
    }

    fn import_summary(result: &ViewAnalysisResult) -> String {
        result
            .imports
            .iter()
            .map(|(name, import_type)| match import_type {
                ViewImportType::FunctionImportWithAlias(alias) => {
                    format!("{alias} (alias for view)")
                }
                other => format!("{name} ({})", other.description()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn call_summary(result: &ViewAnalysisResult) -> String {
        let details = result
            .calls
            .iter()
            .map(|call| {
                let label = result
                    .import_type_of(call)
                    .map(ViewImportType::short_label)
                    .unwrap_or("unknown");
                format!("  - Line {}: {} ({label})", call.line, call.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!("Found {} Tempest view() calls:\n{details}", result.call_count())
    }
}
