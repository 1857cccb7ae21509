//! Resolution of function imports in `use` declarations.
//!
//! PHP offers several ways to bring a namespaced function into scope:
//!
//! ```php
//! use function Tempest\view;                  // single
//! use function Tempest\view as render;        // aliased
//! use function Tempest\{root_path, view};     // grouped
//! use function Tempest\{view as render};      // grouped + aliased
//! use function Tempest\view, Tempest\map;     // comma-separated
//! use Tempest\{Router, function view};        // mixed group
//! ```
//!
//! The grammar nests these differently across tree-sitter-php releases, so the
//! tree is only used to locate declarations, clauses and groups; the names
//! themselves are read from the clause text.

use crate::ast;
use crate::types::{ImportInfo, Result, ViewAnalysisError, ViewImportType, ViewTarget};
use std::collections::BTreeMap;
use tree_sitter::{Node, Tree};

const USE_CLAUSE_KINDS: &[&str] = &["namespace_use_clause", "namespace_use_group_clause"];

pub struct ImportAnalyzer;

impl ImportAnalyzer {
    /// Names under which `target` can be called in this file.
    ///
    /// The qualified and fully qualified names are always present since they
    /// need no import.
    pub fn analyze_imports(
        tree: &Tree,
        text: &str,
        target: &ViewTarget,
    ) -> Result<BTreeMap<String, ViewImportType>> {
        let mut imports = BTreeMap::new();
        imports.insert(target.fully_qualified_name(), ViewImportType::DirectNamespace);
        imports.insert(target.qualified_name(), ViewImportType::DirectNamespace);

        for import in Self::extract_function_imports(tree, text) {
            if !target.matches(&import) {
                continue;
            }

            let (name, import_type) = match import.alias {
                Some(alias) => (
                    alias.clone(),
                    ViewImportType::FunctionImportWithAlias(alias),
                ),
                None => (import.function_name, ViewImportType::FunctionImport),
            };
            imports.insert(name, import_type);
        }

        Ok(imports)
    }

    /// Every function imported by a `use function` declaration in the tree.
    ///
    /// Declarations and clauses that cannot be interpreted are skipped.
    pub fn extract_function_imports(tree: &Tree, text: &str) -> Vec<ImportInfo> {
        let mut infos = Vec::new();

        for node in ast::find_nodes_by_kind(tree, "namespace_use_declaration") {
            match Self::parse_use_declaration(node, text) {
                Ok(parsed) => infos.extend(parsed),
                Err(e) => tracing::trace!("skipping use declaration: {e}"),
            }
        }

        infos
    }

    fn parse_use_declaration(node: Node, text: &str) -> Result<Vec<ImportInfo>> {
        let function_declaration = Self::is_function_use_declaration(node, text)?;

        let imports = match ast::child_of_kind(node, "namespace_use_group") {
            // A plain `use Ns\{...}` group may still mark single clauses with `function`.
            Some(group) => {
                let prefix = Self::group_prefix(node, text)?;
                Self::parse_clauses(group, &prefix, text, !function_declaration)
            }
            None if function_declaration => Self::parse_clauses(node, "", text, false),
            None => {
                return Err(ViewAnalysisError::InvalidImportFormat(
                    "Not a function import".to_string(),
                ));
            }
        };

        if imports.is_empty() {
            return Err(ViewAnalysisError::InvalidImportFormat(
                "No valid use clause found".to_string(),
            ));
        }
        Ok(imports)
    }

    fn is_function_use_declaration(node: Node, text: &str) -> Result<bool> {
        if ast::child_of_kind(node, "function").is_some() {
            return Ok(true);
        }

        let declaration = ast::node_text(&node, text)?;
        Ok(strip_keyword(declaration.trim_start(), "use")
            .and_then(|rest| strip_keyword(rest, "function"))
            .is_some())
    }

    /// The namespace in front of `{`, e.g. `Tempest` for `use function Tempest\{...}`.
    fn group_prefix(declaration: Node, text: &str) -> Result<String> {
        let declaration_text = ast::node_text(&declaration, text)?;
        let (head, _) = declaration_text.split_once('{').ok_or_else(|| {
            ViewAnalysisError::InvalidImportFormat("Grouped import without braces".to_string())
        })?;

        let head = strip_keyword(head.trim_start(), "use").unwrap_or(head);
        let head = strip_keyword(head, "function").unwrap_or(head);

        Ok(head
            .trim()
            .trim_end_matches('\\')
            .trim_start_matches('\\')
            .trim()
            .to_string())
    }

    /// With `clause_keyword` set, only clauses written `function Ns\name` count.
    fn parse_clauses(
        parent: Node,
        prefix: &str,
        text: &str,
        clause_keyword: bool,
    ) -> Vec<ImportInfo> {
        ast::children(parent)
            .into_iter()
            .filter(|child| USE_CLAUSE_KINDS.contains(&child.kind()))
            .filter_map(|clause| {
                match Self::parse_use_clause(clause, prefix, text, clause_keyword) {
                    Ok(info) => Some(info),
                    Err(e) => {
                        tracing::trace!("skipping use clause: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    fn parse_use_clause(
        clause: Node,
        prefix: &str,
        text: &str,
        clause_keyword: bool,
    ) -> Result<ImportInfo> {
        let clause_text = ast::node_text(&clause, text)?.trim();

        if strip_keyword(clause_text, "const").is_some() {
            return Err(ViewAnalysisError::InvalidImportFormat(
                "Constant import".to_string(),
            ));
        }
        let clause_text = match strip_keyword(clause_text, "function") {
            Some(rest) => rest,
            None if clause_keyword => {
                return Err(ViewAnalysisError::InvalidImportFormat(format!(
                    "Class import: {clause_text}"
                )));
            }
            None => clause_text,
        };

        let tokens: Vec<&str> = clause_text.split_whitespace().collect();
        let (path, alias) = match tokens.as_slice() {
            [path] => (*path, None),
            [path, keyword, alias] if keyword.eq_ignore_ascii_case("as") => {
                (*path, Some((*alias).to_string()))
            }
            _ => {
                return Err(ViewAnalysisError::InvalidImportFormat(format!(
                    "Unexpected use clause: {clause_text}"
                )));
            }
        };

        let path = path.trim_start_matches('\\');
        let full_path = if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{prefix}\\{path}")
        };

        let (namespace, function_name) = full_path.rsplit_once('\\').ok_or_else(|| {
            ViewAnalysisError::InvalidImportFormat(format!("Invalid qualified name: {full_path}"))
        })?;

        if namespace.is_empty() || function_name.is_empty() {
            return Err(ViewAnalysisError::InvalidImportFormat(format!(
                "Invalid qualified name: {full_path}"
            )));
        }

        Ok(ImportInfo {
            namespace: namespace.to_string(),
            function_name: function_name.to_string(),
            alias,
        })
    }
}

/// Strip a leading case-insensitive PHP keyword followed by whitespace.
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let head = s.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &s[keyword.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}
