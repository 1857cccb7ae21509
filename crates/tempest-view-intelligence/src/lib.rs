//! Static analysis of Tempest `view()` usage.
//!
//! Given a PHP syntax tree, finds every name the file can use to call
//! `Tempest\view` (see [`ImportAnalyzer`]) and every call made through one of
//! those names together with its arguments (see [`FunctionCallAnalyzer`]).
//!
//! The crate does no I/O; rendering results for humans is left to
//! [`ViewAnalysisReport`].

pub mod ast;
mod calls;
mod imports;
mod report;
mod types;

pub use calls::FunctionCallAnalyzer;
pub use imports::ImportAnalyzer;
pub use report::ViewAnalysisReport;
pub use types::{
    ImportInfo, Result, ViewAnalysisError, ViewAnalysisResult, ViewCall, ViewImportType,
    ViewParameter, ViewTarget,
};

use tree_sitter::Tree;

#[cfg(test)]
mod tests;

pub struct ViewIntelligence;

impl ViewIntelligence {
    /// Imports and the calls that go through them.
    ///
    /// # Errors
    ///
    /// Returns a [`ViewAnalysisError`] if the tree cannot be walked.
    pub fn analyze(tree: &Tree, text: &str, target: &ViewTarget) -> Result<ViewAnalysisResult> {
        let imports = ImportAnalyzer::analyze_imports(tree, text, target)?;
        let calls = FunctionCallAnalyzer::find_function_calls(tree, text)?
            .into_iter()
            .filter(|call| imports.contains_key(&call.function_name))
            .collect();

        Ok(ViewAnalysisResult { imports, calls })
    }

    /// Only the view calls, see [`ViewIntelligence::analyze`].
    pub fn find_view_calls(tree: &Tree, text: &str, target: &ViewTarget) -> Result<Vec<ViewCall>> {
        Self::analyze(tree, text, target).map(|result| result.calls)
    }
}
