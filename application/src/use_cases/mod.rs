//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_round_sequence;
pub mod session_registry;
