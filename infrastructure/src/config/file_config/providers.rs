//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat-completions provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL of the API (can point at any compatible server).
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl FileOpenAiConfig {
    /// The direct key if set and non-empty, otherwise the env var's value.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| lookup(&self.api_key_env).filter(|key| !key.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// OpenAI API settings.
    pub openai: FileOpenAiConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_key_wins() {
        let config = FileOpenAiConfig {
            api_key: Some("sk-direct".to_string()),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|_| Some("sk-env".to_string()));
        assert_eq!(key.as_deref(), Some("sk-direct"));
    }

    #[test]
    fn test_env_key_fallback() {
        let config = FileOpenAiConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "MY_KEY".to_string(),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|name| {
            (name == "MY_KEY").then(|| "sk-env".to_string())
        });
        assert_eq!(key.as_deref(), Some("sk-env"));
        assert!(config.resolve_api_key_with(|_| None).is_none());
    }
}
