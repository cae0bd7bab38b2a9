//! Console output formatter for chat sessions

use colored::{Color, Colorize};
use roundtable_application::SessionStatus;
use roundtable_domain::{Entry, Origin, PersonaCatalog, Reply};

const PALETTE: &[Color] = &[
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Blue,
    Color::Cyan,
    Color::BrightRed,
];

/// Formats replies, transcripts and session status for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// `Name: content`, the name colored consistently per identity
    pub fn format_reply(reply: &Reply) -> String {
        format!(
            "{} {}",
            format!("{}:", reply.identity)
                .color(Self::identity_color(&reply.identity))
                .bold(),
            reply.content
        )
    }

    /// One JSON object on a single line
    pub fn format_reply_json(reply: &Reply) -> String {
        serde_json::to_string(reply).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_transcript(entries: &[Entry]) -> String {
        let mut output = Self::section_header("Transcript");
        for entry in entries {
            let line = match &entry.origin {
                Origin::System => format!("{}", Self::indent(&entry.content, "  ").dimmed()),
                Origin::External => format!("{} {}", "You:".cyan().bold(), entry.content),
                Origin::Responder(name) => {
                    Self::format_reply(&Reply::new(name.clone(), entry.content.clone()))
                }
            };
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    pub fn format_status(status: &SessionStatus) -> String {
        let state = if status.in_flight {
            "replying".yellow().to_string()
        } else if status.pending_triggers > 0 {
            "queued".yellow().to_string()
        } else {
            "idle".green().to_string()
        };

        let mut output = Self::section_header("Session");
        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), status.id));
        output.push_str(&format!("{} {}\n", "Mode:".cyan().bold(), status.mode));
        output.push_str(&format!(
            "{} {}\n",
            "Members:".cyan().bold(),
            status.members.join(", ")
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Entries:".cyan().bold(),
            status.transcript_len
        ));
        output.push_str(&format!(
            "{} {} ({} queued)\n",
            "State:".cyan().bold(),
            state,
            status.pending_triggers
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Last activity:".cyan().bold(),
            status.last_activity.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output
    }

    pub fn format_personas(catalog: &PersonaCatalog) -> String {
        let mut output = Self::section_header("Personas");
        for persona in catalog.personas() {
            if persona.aliases.is_empty() {
                output.push_str(&format!("  * {}\n", persona.name.bold()));
            } else {
                output.push_str(&format!(
                    "  * {} {}\n",
                    persona.name.bold(),
                    format!("({})", persona.aliases.join(", ")).dimmed()
                ));
            }
        }
        output
    }

    pub fn welcome(status: &SessionStatus) -> String {
        let mut output = Self::header("Roundtable");
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "At the table:".cyan().bold(),
            status.members.join(", ")
        ));
        output.push_str(&format!("{} {}\n", "Mode:".cyan().bold(), status.mode));
        output.push_str(&format!("{} {}\n\n", "Session:".cyan().bold(), status.id));
        output.push_str("Type a message and press Enter. /help lists commands.\n");
        output
    }

    fn identity_color(identity: &str) -> Color {
        let hash = identity
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        PALETTE[hash % PALETTE.len()]
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_contains_name_and_content() {
        let line = ConsoleFormatter::format_reply(&Reply::new("Alan Turing", "Machines think."));
        assert!(line.contains("Alan Turing:"));
        assert!(line.ends_with("Machines think."));
    }

    #[test]
    fn test_reply_json_is_single_line() {
        let json = ConsoleFormatter::format_reply_json(&Reply::new("A", "multi\nline"));
        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["identity"], "A");
        assert_eq!(value["content"], "multi\nline");
    }

    #[test]
    fn test_identity_color_is_stable() {
        assert_eq!(
            ConsoleFormatter::identity_color("Marilyn Monroe"),
            ConsoleFormatter::identity_color("Marilyn Monroe")
        );
    }

    #[test]
    fn test_transcript_lists_every_entry() {
        let entries = vec![
            Entry::system("rules"),
            Entry::external("hi"),
            Entry::responder("A", "hello"),
        ];
        let text = ConsoleFormatter::format_transcript(&entries);
        assert!(text.contains("rules"));
        assert!(text.contains("hi"));
        assert!(text.contains("A:"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn test_personas_show_aliases() {
        let text = ConsoleFormatter::format_personas(&PersonaCatalog::builtin());
        assert!(text.contains("Albert Einstein"));
        assert!(text.contains("einstein"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
