//! Config resolution for the language server.
//!
//! Resolves [`ServerConfig`] from multiple sources with the following priority
//! (highest to lowest):
//!
//! 1. CLI flags (applied by the caller after [`resolve_config`] returns)
//! 2. Environment variables (`TEMPEST_LSP_*`)
//! 3. Repo-local `.tempest-lsp.toml` (current directory up to the git root)
//! 4. Global `~/.config/tempest-lsp/config.toml`
//! 5. Compiled-in defaults (via [`ServerConfig::default`])
//!
//! File layers are merged key by key, so a repo-local file only needs the keys
//! it changes. An explicit `--config` path replaces layers 3 and 4.

use super::types::ServerConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Name of the repo-local config file.
pub const REPO_CONFIG_FILE: &str = ".tempest-lsp.toml";

/// Global config path relative to the home directory.
pub const GLOBAL_CONFIG_PATH: &str = ".config/tempest-lsp/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error in {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Resolved configuration plus the files it was read from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server: ServerConfig,
    /// Config files that contributed, lowest priority first.
    pub sources: Vec<PathBuf>,
}

/// Home directory used for the global config.
///
/// `TEMPEST_LSP_HOME` (if set and non-empty) wins over the platform default.
pub fn get_home_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(home) = std::env::var("TEMPEST_LSP_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().ok_or(ConfigError::NoHomeDir)
}

/// Resolve the configuration for the current process.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined, or if an
/// explicit `config_path` cannot be read or parsed. Discovered files that fail
/// to parse are logged and skipped.
pub fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let current_dir = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    let home_dir = get_home_dir()?;
    resolve_config_from(config_path, &current_dir, &home_dir)
}

/// [`resolve_config`] with explicit search roots.
pub fn resolve_config_from(
    config_path: Option<&Path>,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<ResolvedConfig, ConfigError> {
    let mut merged = toml::Table::new();
    let mut sources = Vec::new();

    if let Some(path) = config_path {
        merged.extend(load_table(path)?);
        sources.push(path.to_path_buf());
    } else {
        let global = home_dir.join(GLOBAL_CONFIG_PATH);
        let repo = find_repo_local_config(current_dir);

        for path in std::iter::once(global).chain(repo) {
            if !path.exists() {
                continue;
            }
            let loaded = load_table(&path)
                .and_then(|table| check_table(&path, &table).map(|()| table));
            match loaded {
                Ok(table) => {
                    merged.extend(table);
                    sources.push(path);
                }
                Err(e) => warn!("ignoring config file: {e}"),
            }
        }
    }

    let mut server: ServerConfig = toml::Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;

    apply_env_overrides(&mut server);

    Ok(ResolvedConfig { server, sources })
}

/// Search `current_dir` and its parents, stopping at the git root.
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if dir.join(".git").exists() {
            return None;
        }

        dir = dir.parent()?;
    }
}

fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Check that a discovered table deserializes on its own, so one mistyped
/// file is skipped instead of failing the merged result.
fn check_table(path: &Path, table: &toml::Table) -> Result<(), ConfigError> {
    toml::Value::Table(table.clone())
        .try_into::<ServerConfig>()
        .map(drop)
        .map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply `TEMPEST_LSP_*` environment variable overrides to `cfg`.
///
/// Empty values are treated as unset; unparseable booleans are ignored.
fn apply_env_overrides(cfg: &mut ServerConfig) {
    if let Ok(v) = std::env::var("TEMPEST_LSP_LANGUAGE_IDS") {
        let ids: Vec<String> = v
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        if !ids.is_empty() {
            cfg.language_ids = ids;
        }
    }
    if let Ok(v) = std::env::var("TEMPEST_LSP_LOG_PARSE_TREE") {
        if let Some(b) = parse_bool(&v) {
            cfg.log_parse_tree = b;
        }
    }
    if let Ok(v) = std::env::var("TEMPEST_LSP_REPORT_TO_CLIENT") {
        if let Some(b) = parse_bool(&v) {
            cfg.report_to_client = b;
        }
    }
    if let Ok(v) = std::env::var("TEMPEST_LSP_VIEW_NAMESPACE") {
        if !v.is_empty() {
            cfg.view_namespace = v;
        }
    }
    if let Ok(v) = std::env::var("TEMPEST_LSP_VIEW_FUNCTION") {
        if !v.is_empty() {
            cfg.view_function = v;
        }
    }
}
