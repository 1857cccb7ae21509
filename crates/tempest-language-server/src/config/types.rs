//! Configuration types for the language server.
//!
//! [`ServerConfig`] is deserialized from `.tempest-lsp.toml` (repo-local) or
//! `~/.config/tempest-lsp/config.toml` (global). Every field has a default, so
//! an absent or empty file yields a working configuration.
//!
//! # Example `.tempest-lsp.toml`
//!
//! ```toml
//! language_ids = ["php", "tempest-view", "blade"]
//! log_parse_tree = true
//! view_namespace = "Tempest"
//! view_function = "view"
//! ```

use serde::{Deserialize, Serialize};
use tempest_view_intelligence::ViewTarget;

fn default_language_ids() -> Vec<String> {
    vec!["php".to_string(), "tempest-view".to_string()]
}

fn default_report_to_client() -> bool {
    true
}

fn default_view_namespace() -> String {
    "Tempest".to_string()
}

fn default_view_function() -> String {
    "view".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Editor language ids the server accepts (default: `php`, `tempest-view`)
    #[serde(default = "default_language_ids")]
    pub language_ids: Vec<String>,

    /// Include the tree-sitter S-expression when logging a registered document
    #[serde(default)]
    pub log_parse_tree: bool,

    /// Send view analysis reports to the editor as `window/logMessage`
    #[serde(default = "default_report_to_client")]
    pub report_to_client: bool,

    /// Namespace of the tracked view function
    #[serde(default = "default_view_namespace")]
    pub view_namespace: String,

    /// Name of the tracked view function
    #[serde(default = "default_view_function")]
    pub view_function: String,
}

impl ServerConfig {
    pub fn view_target(&self) -> ViewTarget {
        ViewTarget::new(self.view_namespace.clone(), self.view_function.clone())
    }

    pub fn accepts_language(&self, language_id: &str) -> bool {
        self.language_ids.iter().any(|id| id == language_id)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            language_ids: default_language_ids(),
            log_parse_tree: false,
            report_to_client: default_report_to_client(),
            view_namespace: default_view_namespace(),
            view_function: default_view_function(),
        }
    }
}
