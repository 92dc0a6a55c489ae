//! Configuration file loading for chatflow
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `CHATFLOW_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatflow.toml` or `./.chatflow.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/chatflow/config.toml`
//! 5. Fallback: `~/.config/chatflow/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileChatConfig, FileConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;
