//! Decaying-participation turn policy.
//!
//! Every responder starts a round sequence with the same participation rate,
//! and every responder's rate is multiplied by the same decay factor after
//! each round whether it spoke or not. The number of rounds is therefore a
//! pure function of the three parameters and never depends on the random
//! draws or the roster size.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Parameters of the decaying-participation protocol (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Participation rate every responder is reset to when a sequence starts (R0)
    pub initial_rate: f64,
    /// Factor applied to every rate after each round (D)
    pub decay: f64,
    /// The sequence ends once the highest rate falls below this value (T)
    pub threshold: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            initial_rate: 0.8,
            decay: 2.0 / 3.0,
            threshold: 0.18,
        }
    }
}

impl SchedulerParams {
    /// Build validated parameters.
    ///
    /// `initial_rate` must lie in `[0, 1]`, `decay` in `(0, 1)` and
    /// `threshold` must be positive.
    pub fn new(initial_rate: f64, decay: f64, threshold: f64) -> Result<Self, DomainError> {
        let params = Self {
            initial_rate,
            decay,
            threshold,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.initial_rate) {
            return Err(DomainError::InvalidSchedulerParameter {
                field: "initial_rate",
                value: self.initial_rate,
            });
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(DomainError::InvalidSchedulerParameter {
                field: "decay",
                value: self.decay,
            });
        }
        if !(self.threshold > 0.0) {
            return Err(DomainError::InvalidSchedulerParameter {
                field: "threshold",
                value: self.threshold,
            });
        }
        Ok(())
    }

    /// Participation rate every responder holds when entering round `round`
    /// (zero-based).
    #[cfg(test)]
    fn rate_at(&self, round: usize) -> f64 {
        let mut rate = self.initial_rate;
        for _ in 0..round {
            rate *= self.decay;
        }
        rate
    }

    /// Number of rounds in one sequence: the smallest `k` such that
    /// `initial_rate * decay^k < threshold`.
    ///
    /// Uses the same repeated multiplication the scheduler applies to each
    /// responder, so the two can never disagree through rounding. Valid
    /// parameters always terminate: the rate shrinks towards zero and the
    /// threshold is positive.
    pub fn round_count(&self) -> usize {
        let mut rate = self.initial_rate;
        let mut rounds = 0;
        while rate >= self.threshold {
            rate *= self.decay;
            rounds += 1;
        }
        rounds
    }
}

/// Speaking order for one round: indices into the roster sorted ascending by
/// priority. The sort is stable, so ties keep original roster order.
pub fn speaking_order(priorities: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..priorities.len()).collect();
    order.sort_by_key(|&i| priorities[i]);
    order
}

/// Whether a responder with the given rate speaks for a draw `sample` in `[0, 1)`
pub fn speaks(sample: f64, participation_rate: f64) -> bool {
    sample < participation_rate
}
