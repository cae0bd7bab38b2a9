//! Response sanitizer.
//!
//! A raw backend reply is not trusted as a transcript entry until every
//! speaker marker has been removed from it: a responder must never emit a
//! line attributed to the external participant, to another responder, or to
//! itself.
//!
//! Rules, applied in order on each pass:
//!
//! 1. remove every `User:` marker, anywhere in the text
//! 2. remove every `<identity>:` marker for every known identity
//! 3. if the text opens with a role-asserting prefix (`You:`, `Me:`, `I am`,
//!    `As`, `Speaking as`, or a capitalised `Label:`), drop everything up to
//!    and including the first `:`
//! 4. trim surrounding whitespace
//!
//! Passes repeat until the text stops changing. Every rule either leaves the
//! text alone or shortens it, so this terminates, and the result is a fixed
//! point, which makes [`sanitize`] idempotent.

use crate::prompt::template::EXTERNAL_LABEL;
use regex::Regex;
use std::sync::LazyLock;

/// Separator that follows a speaker label
pub const SEPARATOR: char = ':';

/// Prefixes that assert a role instead of just speaking
const ROLE_PREFIXES: &[&str] = &["You:", "Me:", "I am", "As", "Speaking as"];

/// Generic speaker label: up to three capitalised words followed by `:`
static SPEAKER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}[\w.'\-]*(?:[ \t]+\p{Lu}[\w.'\-]*){0,2}[ \t]*:")
        .expect("speaker label pattern is valid")
});

/// Result of sanitizing one reply, with what was removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// The cleaned text
    pub text: String,
    /// Speaker markers that were removed (e.g. `"User:"`), once per kind
    pub removed_markers: Vec<String>,
    /// Leading role prefixes that were stripped
    pub stripped_prefixes: Vec<String>,
}

impl SanitizeReport {
    /// `true` if the raw text needed no changes beyond trimming
    pub fn is_clean(&self) -> bool {
        self.removed_markers.is_empty() && self.stripped_prefixes.is_empty()
    }
}

/// Clean a raw reply written by `own_identity`.
///
/// Pure and total: the worst case returns the (trimmed) input.
pub fn sanitize(raw: &str, own_identity: &str, known_identities: &[&str]) -> String {
    inspect(raw, own_identity, known_identities).text
}

/// Like [`sanitize`], also reporting which markers and prefixes were removed
pub fn inspect(raw: &str, own_identity: &str, known_identities: &[&str]) -> SanitizeReport {
    let markers = speaker_markers(own_identity, known_identities);
    let mut report = SanitizeReport::default();

    let mut text = raw.to_string();
    loop {
        let next = sanitize_pass(&text, &markers, &mut report);
        if next == text {
            break;
        }
        text = next;
    }

    report.text = text;
    report
}

/// `User:` first, then every known identity (own included), without duplicates
fn speaker_markers(own_identity: &str, known_identities: &[&str]) -> Vec<String> {
    let mut markers: Vec<String> = Vec::with_capacity(known_identities.len() + 2);
    let labels = std::iter::once(EXTERNAL_LABEL)
        .chain(known_identities.iter().copied())
        .chain(std::iter::once(own_identity));

    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        let marker = format!("{label}{SEPARATOR}");
        if !markers.contains(&marker) {
            markers.push(marker);
        }
    }
    markers
}

fn sanitize_pass(text: &str, markers: &[String], report: &mut SanitizeReport) -> String {
    let mut out = text.to_string();

    for marker in markers {
        if out.contains(marker.as_str()) {
            out = out.replace(marker.as_str(), "");
            if !report.removed_markers.contains(marker) {
                report.removed_markers.push(marker.clone());
            }
        }
    }

    let trimmed = out.trim_start();
    if let Some(prefix) = leading_role_prefix(trimmed)
        && let Some(pos) = trimmed.find(SEPARATOR)
    {
        report.stripped_prefixes.push(prefix);
        out = trimmed[pos + SEPARATOR.len_utf8()..].to_string();
    }

    out.trim().to_string()
}

fn leading_role_prefix(text: &str) -> Option<String> {
    for prefix in ROLE_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            // Word prefixes must end on a word boundary ("As a", not "Asteroids")
            let at_boundary = prefix.ends_with(SEPARATOR)
                || rest.chars().next().is_none_or(|c| !c.is_alphanumeric());
            if at_boundary {
                return Some((*prefix).to_string());
            }
        }
    }

    SPEAKER_LABEL.find(text).map(|m| m.as_str().to_string())
}
