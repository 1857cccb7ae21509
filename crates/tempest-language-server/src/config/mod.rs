//! Configuration for the language server.
//!
//! The entry point is [`resolve_config`]; see [`resolve`] for the priority
//! chain and [`types`] for the fields.

mod resolve;
mod types;

pub use resolve::{
    get_home_dir, resolve_config, resolve_config_from, ConfigError, ResolvedConfig,
    GLOBAL_CONFIG_PATH, REPO_CONFIG_FILE,
};
pub use types::ServerConfig;
