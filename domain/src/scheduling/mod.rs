//! Turn-taking policy.
//!
//! Pure pieces of the round-sequence algorithm: parameters and round count,
//! per-round speaking order, and the speak/silent decision. The stateful
//! loop that calls the backend lives in the application layer.

pub mod policy;
