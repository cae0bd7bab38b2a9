//! Responder backend adapters
//!
//! - [`openai::OpenAiBackend`] — OpenAI-compatible chat completions over HTTP
//! - [`echo::EchoBackend`] — offline stand-in that needs no network

pub mod echo;
pub mod openai;

use crate::config::FileConfig;
use roundtable_application::ResponderBackend;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub use echo::EchoBackend;
pub use openai::{OpenAiBackend, OpenAiError, OpenAiSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Echo,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::OpenAi, ProviderKind::Echo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Echo => "echo",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "echo" | "offline" => Ok(ProviderKind::Echo),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Build the backend selected by `[backend] provider`
pub fn build_backend(config: &FileConfig) -> Result<Arc<dyn ResponderBackend>, OpenAiError> {
    let kind = config
        .backend
        .provider
        .parse::<ProviderKind>()
        .map_err(OpenAiError::Config)?;

    match kind {
        ProviderKind::Echo => {
            info!("Using offline echo backend");
            Ok(Arc::new(EchoBackend::new()))
        }
        ProviderKind::OpenAi => {
            let openai = &config.providers.openai;
            let api_key = openai
                .resolve_api_key()
                .ok_or_else(|| OpenAiError::MissingApiKey(openai.api_key_env.clone()))?;
            let settings = OpenAiSettings {
                base_url: openai.base_url.clone(),
                api_key,
                model: config.backend.model.clone(),
                temperature: config.backend.temperature,
                max_tokens: config.backend.max_tokens,
            };
            info!(model = %settings.model, "Using OpenAI-compatible backend");
            Ok(Arc::new(OpenAiBackend::new(settings)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!(" echo ".parse::<ProviderKind>(), Ok(ProviderKind::Echo));
        assert!("bedrock".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::default().to_string(), "openai");
    }

    #[test]
    fn test_build_echo_backend() {
        let mut config = FileConfig::default();
        config.backend.provider = "echo".to_string();
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "echo");
    }

    #[test]
    fn test_build_unknown_provider_fails() {
        let mut config = FileConfig::default();
        config.backend.provider = "telepathy".to_string();
        assert!(matches!(build_backend(&config), Err(OpenAiError::Config(_))));
    }

    #[test]
    fn test_build_openai_with_direct_key() {
        let mut config = FileConfig::default();
        config.providers.openai.api_key = Some("sk-test".to_string());
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "openai");
    }
}
