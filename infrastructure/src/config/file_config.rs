//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are deserialized directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("api.model cannot be empty")]
    EmptyModel,

    #[error("api.max_tokens cannot be 0")]
    InvalidMaxTokens,
}

/// Raw API configuration from TOML
///
/// The key is never written into a config file shipped with the project;
/// it comes from the user's own config or the `CHATFLOW_API_KEY`
/// environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Bearer token for the endpoint
    pub api_key: Option<String>,
    /// Model identifier sent with each request
    pub model: String,
    /// Completion length cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.siliconflow.cn/v1".to_string(),
            api_key: None,
            model: "deepseek-ai/DeepSeek-V3.2-Exp".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Assistant greeting shown at the start of every fresh transcript
    pub welcome_message: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hello! I'm your AI assistant. How can I help you today?"
                .to_string(),
        }
    }
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Path to the history JSON file. Defaults to
    /// `<data dir>/chatflow/history.json` when unset.
    pub history_path: Option<String>,
}

/// Complete raw configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api: FileApiConfig,
    pub chat: FileChatConfig,
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Validate the merged configuration before wiring anything.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.api.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModel);
        }
        if self.api.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }
        Ok(())
    }
}
