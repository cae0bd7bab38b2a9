//! Responder backend port
//!
//! Defines the interface for turning a persona and a transcript into a reply.

use async_trait::async_trait;
use roundtable_domain::Entry;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during one backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Other error: {0}")]
    Other(String),
}

impl BackendError {
    /// Check if this error was caused by the call exceeding its time budget
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout(_))
    }
}

/// Text-generation capability behind every responder
///
/// This port defines how the application layer asks for a reply.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ResponderBackend: Send + Sync {
    /// Generate a raw reply for `persona_prompt` given the whole transcript so far.
    ///
    /// The returned text is untrusted: callers sanitize it before it enters
    /// the transcript.
    async fn generate(&self, persona_prompt: &str, transcript: &[Entry])
    -> Result<String, BackendError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "backend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let error = BackendError::Timeout(Duration::from_secs(30));
        assert_eq!(error.to_string(), "Timed out after 30s");
        assert!(error.is_timeout());
        assert!(!BackendError::Other("x".to_string()).is_timeout());
    }
}
