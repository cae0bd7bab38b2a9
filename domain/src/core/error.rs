//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown persona in roster: {0}")]
    InvalidRoster(String),

    #[error("Persona catalog is empty")]
    EmptyCatalog,

    #[error("Invalid scheduler parameter {field}: {value}")]
    InvalidSchedulerParameter { field: &'static str, value: f64 },
}

impl DomainError {
    /// Check if this error was caused by a roster naming an unknown persona
    pub fn is_invalid_roster(&self) -> bool {
        matches!(self, DomainError::InvalidRoster(_))
    }
}
