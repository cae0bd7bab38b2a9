//! Output format value object

use serde::{Deserialize, Serialize};

/// How drained replies are rendered by a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Identity: content` lines (default)
    #[default]
    Text,
    /// One JSON object per reply
    Json,
}
