//! Structured configuration issues.
//!
//! Configuration loaders report problems as [`ConfigIssue`]s instead of
//! failing on the first one, so a front end can print every problem at once
//! and decide which are fatal.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssueCode {
    /// A scheduler parameter is outside its valid range.
    InvalidSchedulerParameter { field: String, value: f64 },
    /// Two personas share a name or alias.
    DuplicatePersona { name: String },
    /// A persona has an empty name or prompt.
    IncompletePersona { index: usize },
    /// Personas were configured explicitly, but the list is empty.
    EmptyPersonaCatalog,
    /// A duration that must be positive is zero.
    InvalidDuration { field: String },
    /// A string field holds a value outside its allowed set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// The selected backend needs an API key that is not available.
    MissingApiKey { env: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let issue = ConfigIssue::error(
            ConfigIssueCode::MissingApiKey {
                env: "OPENAI_API_KEY".to_string(),
            },
            "missing",
        );
        assert!(issue.is_error());

        let issue = ConfigIssue::warning(
            ConfigIssueCode::DuplicatePersona {
                name: "A".to_string(),
            },
            "dup",
        );
        assert_eq!(issue.severity, Severity::Warning);
        assert!(!issue.is_error());
    }
}
