//! Domain layer for roundtable
//!
//! This crate contains the core entities, value objects and pure logic of a
//! simulated group conversation. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! An append-only log shared by every responder of a session. Its entries are
//! the literal context handed to the backend on every turn.
//!
//! ## Rounds
//!
//! One external message starts a *round sequence*. Each round orders the
//! roster by priority and lets each responder speak with its current
//! participation rate; rates decay every round until the highest falls below
//! a threshold. See [`scheduling::policy`].
//!
//! ## Sanitizing
//!
//! Raw replies are stripped of speaker markers before they enter the
//! transcript, so no entry can impersonate another party. See
//! [`responder::sanitizer`].

pub mod config;
pub mod core;
pub mod persona;
pub mod prompt;
pub mod responder;
pub mod scheduling;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use config::{
    OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use crate::core::{error::DomainError, string::truncate};
pub use persona::catalog::{Persona, PersonaCatalog, ResolvedRoster};
pub use prompt::{PromptTemplate, template::EXTERNAL_LABEL};
pub use responder::{
    entities::Responder,
    sanitizer::{SanitizeReport, inspect, sanitize},
};
pub use scheduling::policy::{SchedulerParams, speaking_order};
pub use session::entities::{Reply, RosterSpec, SessionId, SessionMode};
pub use transcript::entities::{Entry, Origin, Transcript};
