//! Open documents tracked by the server.

use std::collections::HashMap;

use lsp_types::Uri;
use tempest_view_intelligence::ViewAnalysisResult;
use tree_sitter::Tree;

/// An open, parsed PHP document.
#[derive(Debug)]
pub struct Document {
    pub uri: Uri,
    pub language_id: String,
    pub version: i32,
    pub text: String,
    pub tree: Tree,
    /// `None` if the last analysis failed.
    pub analysis: Option<ViewAnalysisResult>,
}

/// Documents keyed by URI.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Uri, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, returning the previous one.
    pub fn insert(&mut self, document: Document) -> Option<Document> {
        self.documents.insert(document.uri.clone(), document)
    }

    pub fn get(&self, uri: &Uri) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn get_mut(&mut self, uri: &Uri) -> Option<&mut Document> {
        self.documents.get_mut(uri)
    }

    pub fn remove(&mut self, uri: &Uri) -> Option<Document> {
        self.documents.remove(uri)
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// URIs of all open documents, sorted.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.documents.keys().map(|uri| uri.as_str()).collect();
        uris.sort_unstable();
        uris
    }
}
