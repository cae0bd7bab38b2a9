//! Interactive chat module
//!
//! Drives a session through the registry's trigger/drain surface: each line
//! becomes a trigger, and replies are printed as the poller drains them.

mod follow;
mod repl;

pub use follow::ReplyFollower;
pub use repl::{ChatRepl, ReplError};
