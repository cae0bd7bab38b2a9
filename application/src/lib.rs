//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DriverParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    reply_observer::{NoObserver, ReplyObserver},
    responder_backend::{BackendError, ResponderBackend},
};
pub use use_cases::run_round_sequence::{
    RoundSequenceOutcome, RunRoundSequenceUseCase, SharedTranscript,
};
pub use use_cases::session_registry::{SessionError, SessionRegistry, SessionStatus};
