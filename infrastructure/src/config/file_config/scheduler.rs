//! Turn-taking configuration from TOML (`[scheduler]` section)

use roundtable_domain::{ConfigIssue, ConfigIssueCode, DomainError, SchedulerParams};
use serde::{Deserialize, Serialize};

/// Turn-taking configuration
///
/// # Example
///
/// ```toml
/// [scheduler]
/// initial_rate = 0.8   # participation rate at the start of every trigger
/// decay = 0.6667       # multiplier applied once per round
/// threshold = 0.18     # sequence ends once every rate is below this
/// seed = 42            # optional, makes draws reproducible
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSchedulerConfig {
    pub initial_rate: f64,
    pub decay: f64,
    pub threshold: f64,
    pub seed: Option<u64>,
}

impl Default for FileSchedulerConfig {
    fn default() -> Self {
        let params = SchedulerParams::default();
        Self {
            initial_rate: params.initial_rate,
            decay: params.decay,
            threshold: params.threshold,
            seed: None,
        }
    }
}

impl FileSchedulerConfig {
    /// Convert to domain parameters, falling back to the defaults on any
    /// out-of-range value.
    pub fn to_scheduler_params(&self) -> (SchedulerParams, Vec<ConfigIssue>) {
        match SchedulerParams::new(self.initial_rate, self.decay, self.threshold) {
            Ok(params) => (params, Vec::new()),
            Err(DomainError::InvalidSchedulerParameter { field, value }) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidSchedulerParameter {
                        field: field.to_string(),
                        value,
                    },
                    format!("scheduler.{field}: {value} is out of range"),
                );
                (SchedulerParams::default(), vec![issue])
            }
            Err(other) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidSchedulerParameter {
                        field: "scheduler".to_string(),
                        value: f64::NAN,
                    },
                    other.to_string(),
                );
                (SchedulerParams::default(), vec![issue])
            }
        }
    }
}
