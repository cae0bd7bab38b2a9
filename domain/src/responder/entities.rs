//! Responder entity

use crate::persona::catalog::Persona;
use crate::scheduling::policy::{SchedulerParams, speaks};

/// A roster member: a persona plus its private turn-taking state (Entity)
///
/// `participation_rate` and `priority` only mean something within one round
/// sequence; [`Responder::reset`] puts them back to their starting values
/// whenever a new external message arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct Responder {
    identity: String,
    persona_prompt: String,
    participation_rate: f64,
    priority: u32,
}

impl Responder {
    pub fn new(identity: impl Into<String>, persona_prompt: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            persona_prompt: persona_prompt.into(),
            participation_rate: SchedulerParams::default().initial_rate,
            priority: 1,
        }
    }

    pub fn from_persona(persona: &Persona) -> Self {
        Self::new(&persona.name, &persona.prompt)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn persona_prompt(&self) -> &str {
        &self.persona_prompt
    }

    pub fn participation_rate(&self) -> f64 {
        self.participation_rate
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Reset scheduling state at the start of a round sequence
    pub fn reset(&mut self, initial_rate: f64) {
        self.participation_rate = initial_rate;
        self.priority = 1;
    }

    /// Whether this responder takes the floor for the given draw in `[0, 1)`
    pub fn wants_to_speak(&self, sample: f64) -> bool {
        speaks(sample, self.participation_rate)
    }

    /// Record the outcome of this responder's turn in a round.
    ///
    /// A speaker moves to the front of the next round (priority 1), a silent
    /// responder sinks one place. The rate decays exactly once either way.
    pub fn finish_turn(&mut self, spoke: bool, decay: f64) {
        if spoke {
            self.priority = 1;
        } else {
            self.priority = self.priority.saturating_add(1);
        }
        self.participation_rate *= decay;
    }
}
