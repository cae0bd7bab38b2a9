//! Session domain.
//!
//! - [`entities::SessionId`] — opaque conversation identifier
//! - [`entities::SessionMode`] — single- or multi-responder rounds
//! - [`entities::RosterSpec`] — requested roster for a new session
//! - [`entities::Reply`] — a produced reply awaiting retrieval

pub mod entities;
