//! Data types produced by the view analysis.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while walking a syntax tree.
#[derive(Debug, Error)]
pub enum ViewAnalysisError {
    /// The tree did not have the shape the analyzer expected.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A node's byte range was not valid UTF-8 in the source text.
    #[error("Failed to extract text from node")]
    TextExtractionError,

    /// A `use` declaration could not be interpreted as a function import.
    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),
}

pub type Result<T> = std::result::Result<T, ViewAnalysisError>;

/// The namespaced function whose usage is tracked.
///
/// Defaults to Tempest's `Tempest\view`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewTarget {
    pub namespace: String,
    pub function: String,
}

impl ViewTarget {
    pub fn new(namespace: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            function: function.into(),
        }
    }

    /// Qualified name without a leading separator, e.g. `Tempest\view`.
    pub fn qualified_name(&self) -> String {
        format!("{}\\{}", self.namespace, self.function)
    }

    /// Fully qualified name, e.g. `\Tempest\view`.
    pub fn fully_qualified_name(&self) -> String {
        format!("\\{}", self.qualified_name())
    }

    /// Whether an imported function resolves to this target.
    pub fn matches(&self, import: &ImportInfo) -> bool {
        import.namespace == self.namespace && import.function_name == self.function
    }
}

impl Default for ViewTarget {
    fn default() -> Self {
        Self::new("Tempest", "view")
    }
}

/// One function brought into scope by a `use function` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub namespace: String,
    pub function_name: String,
    pub alias: Option<String>,
}

/// How a name in the file resolves to the view function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "alias", rename_all = "snake_case")]
pub enum ViewImportType {
    DirectNamespace,
    FunctionImport,
    FunctionImportWithAlias(String),
}

impl ViewImportType {
    pub fn description(&self) -> &'static str {
        match self {
            ViewImportType::DirectNamespace => "direct namespace",
            ViewImportType::FunctionImport => "function import",
            ViewImportType::FunctionImportWithAlias(_) => "function import with alias",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            ViewImportType::DirectNamespace => "direct",
            ViewImportType::FunctionImport => "imported",
            ViewImportType::FunctionImportWithAlias(_) => "aliased",
        }
    }
}

/// A single argument passed to a view call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParameter {
    /// Set for named arguments (`path: ...`).
    pub name: Option<String>,
    /// The argument expression, without the `name:` prefix.
    pub value: String,
    pub raw_text: String,
}

/// A function call found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCall {
    /// Callee exactly as written, e.g. `view`, `Tempest\view`, `\Tempest\view`.
    pub function_name: String,
    /// 1-based line of the call.
    pub line: usize,
    /// 0-based byte column of the call.
    pub column: usize,
    pub text: String,
    pub parameters: Vec<ViewParameter>,
}

/// Imports and matching calls for one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewAnalysisResult {
    /// Names that resolve to the view function, keyed by the name used at call sites.
    pub imports: BTreeMap<String, ViewImportType>,
    pub calls: Vec<ViewCall>,
}

impl ViewAnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn has_view_usage(&self) -> bool {
        !self.calls.is_empty()
            || self
                .imports
                .values()
                .any(|t| *t != ViewImportType::DirectNamespace)
    }

    /// How the callee of `call` was resolved, if it was.
    pub fn import_type_of(&self, call: &ViewCall) -> Option<&ViewImportType> {
        self.imports.get(&call.function_name)
    }
}
