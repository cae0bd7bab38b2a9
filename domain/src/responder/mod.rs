//! Responder domain.
//!
//! - [`entities::Responder`] — persona plus decaying turn-taking state
//! - [`sanitizer`] — strips speaker markers from raw backend replies

pub mod entities;
pub mod sanitizer;
