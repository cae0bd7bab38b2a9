//! Transcript domain.
//!
//! - [`entities::Transcript`] — the append-only dialogue log of a session
//! - [`entities::Entry`] — one line of dialogue
//! - [`entities::Origin`] — who wrote an entry

pub mod entities;
