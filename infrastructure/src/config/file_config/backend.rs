//! Backend selection from TOML (`[backend]` section)

use crate::providers::ProviderKind;
use roundtable_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Which backend generates replies, and with what request parameters
///
/// # Example
///
/// ```toml
/// [backend]
/// provider = "openai"     # or "echo" for an offline stand-in
/// model = "gpt-4o-mini"
/// temperature = 0.7
/// max_tokens = 150
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi.as_str().to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 150,
        }
    }
}

impl FileBackendConfig {
    /// Parse the provider name, collecting an issue for unknown values.
    pub fn parse_provider(&self) -> (Option<ProviderKind>, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind) => (Some(kind), Vec::new()),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "backend.provider".to_string(),
                        value: self.provider.clone(),
                        valid_values: ProviderKind::ALL
                            .iter()
                            .map(|k| k.as_str().to_string())
                            .collect(),
                    },
                    format!("backend.provider: unknown provider '{}'", self.provider),
                );
                (None, vec![issue])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_provider() {
        let config = FileBackendConfig {
            provider: "Echo".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_provider(), (Some(ProviderKind::Echo), vec![]));
    }

    #[test]
    fn test_parse_unknown_provider() {
        let config = FileBackendConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let (kind, issues) = config.parse_provider();
        assert!(kind.is_none());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidEnumValue { field, .. } if field == "backend.provider"
        ));
    }
}
