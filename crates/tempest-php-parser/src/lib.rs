//! Thread-safe PHP parsing for the Tempest language tooling.
//!
//! [`PhpParser`] wraps a single tree-sitter [`Parser`] configured with the
//! `tree-sitter-php` grammar. The grammar variant used is `LANGUAGE_PHP`, which
//! understands `<?php` files with inline HTML, so both controllers and
//! `*.view.php` templates parse.
//!
//! Tree-sitter parsers are stateful and not `Sync`, so the parser lives behind
//! a [`Mutex`] and callers share a `&PhpParser`.

use std::sync::Mutex;

use thiserror::Error;
use tree_sitter::{Parser, Tree};

/// Errors produced while creating or using a [`PhpParser`].
#[derive(Debug, Error)]
pub enum PhpParserError {
    /// The PHP grammar could not be loaded into the parser.
    #[error("Parser initialization error: {0}")]
    UnableToInitialize(String),

    /// The parser mutex was poisoned by a panicking thread.
    #[error("Parser lock error: {0}")]
    UnableToAcquireLock(String),

    /// Tree-sitter returned no tree (cancelled or timed out).
    #[error("Unable to parse source code")]
    UnableToParse,
}

/// A PHP parser that can be shared between threads.
pub struct PhpParser {
    parser: Mutex<Parser>,
}

impl std::fmt::Debug for PhpParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhpParser")
            .field("parser", &"<Mutex<Parser>>")
            .finish()
    }
}

impl PhpParser {
    /// Create a parser for PHP source.
    ///
    /// # Errors
    ///
    /// Returns [`PhpParserError::UnableToInitialize`] if the grammar's ABI
    /// version is incompatible with the linked tree-sitter runtime.
    pub fn new() -> Result<Self, PhpParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| {
                PhpParserError::UnableToInitialize(format!("Unable to create parser for PHP: {e}"))
            })?;

        Ok(Self {
            parser: Mutex::new(parser),
        })
    }

    /// Parse `source_code` into a syntax tree.
    ///
    /// Pass the previous tree as `old_tree` to let tree-sitter reuse unchanged
    /// subtrees. The old tree must describe the same text (or have been edited
    /// with [`Tree::edit`]); callers replacing the whole document pass `None`.
    ///
    /// Syntax errors do not fail the parse: they appear as `ERROR` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`PhpParserError::UnableToAcquireLock`] if the mutex is poisoned
    /// and [`PhpParserError::UnableToParse`] if tree-sitter produced no tree.
    pub fn parse(&self, source_code: &str, old_tree: Option<&Tree>) -> Result<Tree, PhpParserError> {
        let mut parser = self.parser.lock().map_err(|_| {
            PhpParserError::UnableToAcquireLock("Could not get a lock on the parser".to_string())
        })?;

        parser
            .parse(source_code, old_tree)
            .ok_or(PhpParserError::UnableToParse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_parse_simple_function_call() {
        let parser = PhpParser::new().unwrap();
        let tree = parser.parse("<?php\nview('home.view.php');\n", None).unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), "program");
        assert!(!root.has_error());
        assert!(root.to_sexp().contains("function_call_expression"));
    }

    #[test]
    fn test_parse_empty_source() {
        let parser = PhpParser::new().unwrap();
        let tree = parser.parse("", None).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
        assert_eq!(tree.root_node().named_child_count(), 0);
    }

    #[test]
    fn test_broken_source_still_produces_tree() {
        let parser = PhpParser::new().unwrap();
        let tree = parser.parse("<?php\nfunction (\n", None).unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_reparse_with_old_tree() {
        let parser = PhpParser::new().unwrap();
        let source = "<?php\nuse function Tempest\\view;\n";
        let first = parser.parse(source, None).unwrap();
        let second = parser.parse(source, Some(&first)).unwrap();
        assert_eq!(first.root_node().to_sexp(), second.root_node().to_sexp());
    }

    #[test]
    fn test_parser_shared_across_threads() {
        let parser = Arc::new(PhpParser::new().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = Arc::clone(&parser);
                std::thread::spawn(move || {
                    let source = format!("<?php\n$x{i} = view('t{i}.view.php');\n");
                    parser.parse(&source, None).map(|t| t.root_node().kind().to_string())
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "program");
        }
    }
}
