//! Presentation layer for roundtable
//!
//! This crate contains CLI definitions, output formatters
//! and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplError, ReplyFollower};
pub use cli::commands::{Cli, ModeArg, OutputFormat};
pub use output::console::ConsoleFormatter;
