//! Polling retrieval of replies

use roundtable_application::{ResponderBackend, SessionError, SessionRegistry};
use roundtable_domain::{Reply, SessionId};
use std::time::Duration;
use tracing::debug;

/// Polls a session's output until its round sequences have finished
pub struct ReplyFollower {
    poll_interval: Duration,
}

impl Default for ReplyFollower {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ReplyFollower {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Drain replies into `on_reply` until the session is idle and empty.
    ///
    /// Returns how many replies were delivered.
    pub async fn follow<B, F>(
        &self,
        registry: &SessionRegistry<B>,
        id: &SessionId,
        mut on_reply: F,
    ) -> Result<usize, SessionError>
    where
        B: ResponderBackend + ?Sized + 'static,
        F: FnMut(&Reply),
    {
        let mut delivered = 0;
        loop {
            // Read status before draining so a reply appended just before the
            // sequence finished is still picked up by this drain.
            let busy = registry.status(id)?.is_busy();
            for reply in registry.drain(id)? {
                on_reply(&reply);
                delivered += 1;
            }
            if !busy {
                debug!("Session {} idle after {} replies", id, delivered);
                return Ok(delivered);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
