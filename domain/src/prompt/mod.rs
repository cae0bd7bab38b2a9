//! Prompt domain
//!
//! Fixed texts the system writes into a transcript or hands to the backend.

pub mod template;

pub use template::PromptTemplate;
