//! Extraction of function calls and their arguments.

use crate::ast;
use crate::types::{Result, ViewAnalysisError, ViewCall, ViewParameter};
use tree_sitter::{Node, Tree};

pub struct FunctionCallAnalyzer;

impl FunctionCallAnalyzer {
    /// Every `function_call_expression` in document order.
    ///
    /// Method calls (`$this->view()`) and static calls (`View::make()`) are
    /// different node kinds and never appear here.
    pub fn find_function_calls(tree: &Tree, text: &str) -> Result<Vec<ViewCall>> {
        let calls = ast::find_nodes_by_kind(tree, "function_call_expression")
            .into_iter()
            .filter_map(|node| match Self::extract_call(node, text) {
                Ok(call) => Some(call),
                Err(e) => {
                    tracing::trace!("skipping function call: {e}");
                    None
                }
            })
            .collect();

        Ok(calls)
    }

    fn extract_call(node: Node, text: &str) -> Result<ViewCall> {
        let function_node = node.child_by_field_name("function").ok_or_else(|| {
            ViewAnalysisError::ParseError("Function call missing function field".to_string())
        })?;

        let position = node.start_position();

        Ok(ViewCall {
            function_name: ast::node_text(&function_node, text)?.to_string(),
            line: position.row + 1,
            column: position.column,
            text: ast::node_text(&node, text)?.to_string(),
            parameters: Self::parse_arguments(node, text)?,
        })
    }

    fn parse_arguments(node: Node, text: &str) -> Result<Vec<ViewParameter>> {
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return Ok(Vec::new());
        };

        ast::children(arguments)
            .into_iter()
            .filter(|child| child.kind() == "argument")
            .map(|argument| Self::parse_argument(argument, text))
            .collect()
    }

    fn parse_argument(node: Node, text: &str) -> Result<ViewParameter> {
        let raw_text = ast::node_text(&node, text)?.to_string();

        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(ViewParameter {
                name: None,
                value: raw_text.clone(),
                raw_text,
            });
        };

        let name = ast::node_text(&name_node, text)?.to_string();

        // Everything after `name:` is the value expression.
        let value = text
            .get(name_node.end_byte()..node.end_byte())
            .ok_or(ViewAnalysisError::TextExtractionError)?
            .trim_start();
        let value = value.strip_prefix(':').unwrap_or(value).trim();

        Ok(ViewParameter {
            name: Some(name),
            value: value.to_string(),
            raw_text,
        })
    }
}
