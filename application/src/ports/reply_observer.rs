//! Reply observer port
//!
//! Defines the callbacks a round sequence reports to while it runs.

use crate::ports::responder_backend::BackendError;
use roundtable_domain::Reply;

/// Callbacks for events during a round sequence
///
/// The session driver uses this to publish each reply to its pending-output
/// buffer as soon as it exists, not only when the sequence ends.
pub trait ReplyObserver: Send + Sync {
    /// Called after a sanitized reply has been appended to the transcript
    fn on_reply(&self, reply: &Reply);

    /// Called at the start of each round with the speaking order
    fn on_round_start(&self, _round: usize, _order: &[&str]) {}

    /// Called when a responder's backend call failed (before the placeholder
    /// reply is published)
    fn on_backend_error(&self, _identity: &str, _error: &BackendError) {}
}

/// No-op observer for when nobody is listening
pub struct NoObserver;

impl ReplyObserver for NoObserver {
    fn on_reply(&self, _reply: &Reply) {}
}
