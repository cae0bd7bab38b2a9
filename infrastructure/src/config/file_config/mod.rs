//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod driver;
mod logging;
mod output;
mod personas;
mod providers;
mod scheduler;

pub use backend::FileBackendConfig;
pub use driver::FileDriverConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileOpenAiConfig, FileProvidersConfig};
pub use scheduler::FileSchedulerConfig;

use roundtable_application::DriverParams;
use roundtable_domain::{ConfigIssue, ConfigIssueCode, Persona, PersonaCatalog};
use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Turn-taking parameters
    pub scheduler: FileSchedulerConfig,
    /// Pacing and backend time budget
    pub driver: FileDriverConfig,
    /// Reply generator selection
    pub backend: FileBackendConfig,
    /// Provider credentials and endpoints
    pub providers: FileProvidersConfig,
    /// Persona catalog (built-in set when absent)
    pub personas: Option<Vec<Persona>>,
    /// Output settings
    pub output: FileOutputConfig,
    /// Conversation log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Scheduler parameter ranges
    /// 2. Driver durations
    /// 3. The backend provider name and, for OpenAI, an available API key
    /// 4. Persona completeness and name clashes
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.validate_with_env(|name| std::env::var(name).ok())
    }

    /// [`validate`](Self::validate) with an explicit environment lookup.
    pub fn validate_with_env(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.scheduler.to_scheduler_params().1);
        issues.extend(self.driver.validate());

        let (provider, provider_issues) = self.backend.parse_provider();
        issues.extend(provider_issues);
        if provider == Some(ProviderKind::OpenAi)
            && self.providers.openai.resolve_api_key_with(&lookup).is_none()
        {
            let env = self.providers.openai.api_key_env.clone();
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey { env: env.clone() },
                format!(
                    "backend.provider is 'openai' but neither providers.openai.api_key nor ${env} is set"
                ),
            ));
        }

        issues.extend(personas::validate_personas(self.personas.as_deref()));
        issues
    }

    /// Persona catalog to resolve rosters against
    pub fn persona_catalog(&self) -> PersonaCatalog {
        personas::catalog_from(self.personas.as_deref())
    }

    /// Driver parameters; invalid scheduler values fall back to the defaults.
    pub fn driver_params(&self) -> DriverParams {
        let mut params = DriverParams::default()
            .with_scheduler(self.scheduler.to_scheduler_params().0)
            .with_reply_delay(self.driver.reply_delay())
            .with_backend_timeout(self.driver.backend_timeout());
        if let Some(seed) = self.scheduler.seed {
            params = params.with_seed(seed);
        }
        params
    }
}
