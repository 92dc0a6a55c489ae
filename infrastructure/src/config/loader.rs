//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CHATFLOW_`-prefixed environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./chatflow.toml` or `./.chatflow.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/chatflow/config.toml`
    /// 5. Fallback: `~/.config/chatflow/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        // Project-level config files (check both names)
        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        // Explicit config path (highest priority for files)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // CHATFLOW_API_KEY maps to api.api_key, and so on
        figment = figment.merge(Env::prefixed("CHATFLOW_").map(|key| {
            match key.as_str() {
                "API_KEY" => "api.api_key".into(),
                "BASE_URL" => "api.base_url".into(),
                "MODEL" => "api.model".into(),
                "HISTORY_PATH" => "storage.history_path".into(),
                other => other.to_lowercase().replace("__", ".").into(),
            }
        }));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/chatflow/config.toml if set,
    /// otherwise falls back to ~/.config/chatflow/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chatflow").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["chatflow.toml", ".chatflow.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Default location of the history file when the config does not set one.
    pub fn default_history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("chatflow").join("history.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_defaults_matches_file_config_default() {
        let config = ConfigLoader::load_defaults();
        assert!(config.api.api_key.is_none());
        assert_eq!(config.api.max_tokens, 2048);
    }

    #[test]
    fn global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("chatflow"));
    }

    #[test]
    fn explicit_path_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
            [api]
            model = "other-model"
            temperature = 0.2
            "#,
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.api.model, "other-model");
        assert_eq!(config.api.temperature, 0.2);
        // Untouched keys keep their defaults
        assert_eq!(config.api.max_tokens, 2048);
    }
}
