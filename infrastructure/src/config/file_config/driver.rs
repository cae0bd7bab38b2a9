//! Session driver configuration from TOML (`[driver]` section)

use roundtable_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and time budget for round sequences
///
/// # Example
///
/// ```toml
/// [driver]
/// reply_delay_ms = 250       # pause after each reply in group chats, 0 disables
/// backend_timeout_secs = 60  # a slower backend call counts as a failure
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDriverConfig {
    pub reply_delay_ms: u64,
    pub backend_timeout_secs: u64,
}

impl Default for FileDriverConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 250,
            backend_timeout_secs: 60,
        }
    }
}

impl FileDriverConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.backend_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidDuration {
                    field: "driver.backend_timeout_secs".to_string(),
                },
                "driver.backend_timeout_secs cannot be 0",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let config = FileDriverConfig::default();
        assert_eq!(config.reply_delay(), Duration::from_millis(250));
        assert_eq!(config.backend_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = FileDriverConfig {
            backend_timeout_secs: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }
}
