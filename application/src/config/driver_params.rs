//! Driver parameters — round-sequence control.
//!
//! [`DriverParams`] groups the static parameters that control how a session
//! driver runs a round sequence. The turn-taking numbers themselves are
//! domain policy ([`SchedulerParams`]); pacing, timeouts and seeding are
//! application concerns.

use roundtable_domain::SchedulerParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Round-sequence control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverParams {
    /// Participation-rate policy.
    pub scheduler: SchedulerParams,
    /// Pause after each reply in multi-responder mode.
    pub reply_delay: Duration,
    /// Time budget for a single backend call.
    pub backend_timeout: Duration,
    /// Fixed RNG seed. Each session derives its own stream from it.
    pub seed: Option<u64>,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            scheduler: SchedulerParams::default(),
            reply_delay: Duration::from_millis(250),
            backend_timeout: Duration::from_secs(60),
            seed: None,
        }
    }
}

impl DriverParams {
    // ==================== Builder Methods ====================

    pub fn with_scheduler(mut self, scheduler: SchedulerParams) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parameters for tests: no pacing and a fixed seed.
    pub fn immediate(seed: u64) -> Self {
        Self::default()
            .with_reply_delay(Duration::ZERO)
            .with_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DriverParams::default();
        assert_eq!(params.reply_delay, Duration::from_millis(250));
        assert_eq!(params.backend_timeout, Duration::from_secs(60));
        assert_eq!(params.scheduler.round_count(), 4);
        assert!(params.seed.is_none());
    }

    #[test]
    fn test_builder() {
        let params = DriverParams::default()
            .with_reply_delay(Duration::ZERO)
            .with_backend_timeout(Duration::from_secs(5))
            .with_seed(7);
        assert_eq!(params.reply_delay, Duration::ZERO);
        assert_eq!(params.backend_timeout, Duration::from_secs(5));
        assert_eq!(params.seed, Some(7));
    }

    #[test]
    fn test_immediate() {
        let params = DriverParams::immediate(3);
        assert_eq!(params.reply_delay, Duration::ZERO);
        assert_eq!(params.seed, Some(3));
    }
}
