//! Small helpers for walking tree-sitter syntax trees.

use crate::types::{Result, ViewAnalysisError};
use tree_sitter::{Node, Tree};

/// Source text covered by `node`.
pub fn node_text<'s>(node: &Node, text: &'s str) -> Result<&'s str> {
    node.utf8_text(text.as_bytes())
        .map_err(|_| ViewAnalysisError::TextExtractionError)
}

/// Every node of `kind` in the tree, in document (pre-)order.
pub fn find_nodes_by_kind<'t>(tree: &'t Tree, kind: &str) -> Vec<Node<'t>> {
    descendants_of_kind(tree.root_node(), kind)
}

/// Every descendant of `root` (including `root`) of `kind`, in document order.
pub fn descendants_of_kind<'t>(root: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.kind() == kind {
            nodes.push(node);
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.node() == root {
                return nodes;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return nodes;
            }
        }
    }
}

/// Direct children of `node`.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// First direct child of `node` of `kind`.
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|child| child.kind() == kind)
}
