//! Persona catalog: the configured set of personas a roster may draw from.

use crate::core::error::DomainError;
use crate::session::entities::{RosterSpec, SessionMode};
use serde::{Deserialize, Serialize};

/// A persona definition (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Canonical identity, used as the speaker name in the transcript
    pub name: String,
    /// Alternative names accepted in a roster (matched case-insensitively)
    #[serde(default)]
    pub aliases: Vec<String>,
    /// System prompt handed to the backend for this persona
    pub prompt: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            prompt: prompt.into(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Whether `query` names this persona (canonical name or alias)
    pub fn answers_to(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(query))
    }
}

/// A resolved roster: personas in roster order plus the session mode
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoster {
    pub personas: Vec<Persona>,
    pub mode: SessionMode,
}

impl ResolvedRoster {
    pub fn identities(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }
}

/// The configured persona set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    /// Catalog used when no personas are configured
    pub fn builtin() -> Self {
        Self::new(vec![
            Persona::new(
                "Albert Einstein",
                builtin_prompt(
                    "Albert Einstein",
                    "a physicist who talks about the cosmos with playful insight",
                ),
            )
            .with_alias("einstein"),
            Persona::new(
                "Marilyn Monroe",
                builtin_prompt(
                    "Marilyn Monroe",
                    "a film star with quick wit who talks about life, art and the spotlight",
                ),
            )
            .with_alias("monroe"),
            Persona::new(
                "Alan Turing",
                builtin_prompt(
                    "Alan Turing",
                    "a mathematician who enjoys logic puzzles, machines and codes",
                ),
            )
            .with_alias("turing"),
        ])
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn names(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Look up a persona by name or alias
    pub fn find(&self, query: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.answers_to(query))
    }

    /// Resolve a roster request against this catalog.
    ///
    /// - no members: the whole catalog, multi-responder
    /// - one member: single-responder unless a mode is given
    /// - more: multi-responder unless a mode is given
    ///
    /// Repeated members collapse onto their first occurrence. Any unknown
    /// name fails the whole request.
    pub fn resolve(&self, spec: &RosterSpec) -> Result<ResolvedRoster, DomainError> {
        if self.personas.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }

        if spec.members.is_empty() {
            return Ok(ResolvedRoster {
                personas: self.personas.clone(),
                mode: spec.mode.unwrap_or(SessionMode::MultiResponder),
            });
        }

        let mut personas: Vec<Persona> = Vec::with_capacity(spec.members.len());
        for member in &spec.members {
            let persona = self
                .find(member)
                .ok_or_else(|| DomainError::InvalidRoster(member.clone()))?;
            if !personas.iter().any(|p| p.name == persona.name) {
                personas.push(persona.clone());
            }
        }

        let mode = spec.mode.unwrap_or(if personas.len() == 1 {
            SessionMode::SingleResponder
        } else {
            SessionMode::MultiResponder
        });

        Ok(ResolvedRoster { personas, mode })
    }
}

fn builtin_prompt(name: &str, character: &str) -> String {
    format!(
        "You are {name}, {character}, chatting casually with friends. \
         Keep replies very short, like a text message, and do not end them with a question. \
         Never prefix a reply with 'User:' or any name followed by a colon, \
         and never write as the user or as another character. \
         Do not open with 'I am {name}' or 'As a ...'; just speak naturally as yourself."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_alias_case_insensitive() {
        let catalog = PersonaCatalog::builtin();
        assert_eq!(catalog.find("EINSTEIN").unwrap().name, "Albert Einstein");
        assert_eq!(catalog.find("alan turing").unwrap().name, "Alan Turing");
        assert!(catalog.find("tesla").is_none());
    }

    #[test]
    fn test_resolve_empty_is_everyone_multi() {
        let catalog = PersonaCatalog::builtin();
        let roster = catalog.resolve(&RosterSpec::everyone()).unwrap();
        assert_eq!(roster.personas.len(), 3);
        assert_eq!(roster.mode, SessionMode::MultiResponder);
    }

    #[test]
    fn test_resolve_single_member_is_single_mode() {
        let catalog = PersonaCatalog::builtin();
        let roster = catalog.resolve(&RosterSpec::of(["monroe"])).unwrap();
        assert_eq!(roster.identities(), vec!["Marilyn Monroe"]);
        assert_eq!(roster.mode, SessionMode::SingleResponder);
    }

    #[test]
    fn test_resolve_explicit_mode_wins() {
        let catalog = PersonaCatalog::builtin();
        let roster = catalog
            .resolve(&RosterSpec::of(["monroe"]).with_mode(SessionMode::MultiResponder))
            .unwrap();
        assert_eq!(roster.mode, SessionMode::MultiResponder);
    }

    #[test]
    fn test_resolve_keeps_order_and_dedups() {
        let catalog = PersonaCatalog::builtin();
        let roster = catalog
            .resolve(&RosterSpec::of(["turing", "einstein", "Alan Turing"]))
            .unwrap();
        assert_eq!(roster.identities(), vec!["Alan Turing", "Albert Einstein"]);
        assert_eq!(roster.mode, SessionMode::MultiResponder);
    }

    #[test]
    fn test_resolve_unknown_member_fails() {
        let catalog = PersonaCatalog::builtin();
        let err = catalog
            .resolve(&RosterSpec::of(["einstein", "tesla"]))
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidRoster("tesla".to_string()));
    }

    #[test]
    fn test_resolve_against_empty_catalog() {
        let catalog = PersonaCatalog::default();
        assert_eq!(
            catalog.resolve(&RosterSpec::everyone()).unwrap_err(),
            DomainError::EmptyCatalog
        );
    }
}
