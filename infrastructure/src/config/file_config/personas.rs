//! Persona catalog from TOML (`[[personas]]` tables)
//!
//! ```toml
//! [[personas]]
//! name = "Ada Lovelace"
//! aliases = ["ada", "lovelace"]
//! prompt = "You are Ada Lovelace, ..."
//! ```
//!
//! Leaving the tables out keeps the built-in catalog. An explicit empty list
//! (`personas = []`) is an error.

use roundtable_domain::{ConfigIssue, ConfigIssueCode, Persona, PersonaCatalog};

/// Build the catalog: configured personas, or the built-in set if none are given.
pub fn catalog_from(personas: Option<&[Persona]>) -> PersonaCatalog {
    match personas {
        Some(list) => PersonaCatalog::new(list.to_vec()),
        None => PersonaCatalog::builtin(),
    }
}

pub fn validate_personas(personas: Option<&[Persona]>) -> Vec<ConfigIssue> {
    let Some(personas) = personas else {
        return Vec::new();
    };

    let mut issues = Vec::new();
    if personas.is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::EmptyPersonaCatalog,
            "personas: list is empty, no session could be started",
        ));
        return issues;
    }

    let mut seen: Vec<String> = Vec::new();
    for (index, persona) in personas.iter().enumerate() {
        if persona.name.trim().is_empty() || persona.prompt.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::IncompletePersona { index },
                format!("personas[{index}]: name and prompt are required"),
            ));
            continue;
        }

        for label in std::iter::once(&persona.name).chain(persona.aliases.iter()) {
            let key = label.to_lowercase();
            if seen.contains(&key) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicatePersona {
                        name: label.clone(),
                    },
                    format!("personas[{index}]: '{label}' is already taken, the first match wins"),
                ));
            } else {
                seen.push(key);
            }
        }
    }
    issues
}
