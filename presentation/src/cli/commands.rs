//! CLI command definitions

use clap::{Parser, ValueEnum};
use roundtable_domain::SessionMode;
use std::path::PathBuf;

/// Output format for replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored `Name: reply` lines
    Text,
    /// One JSON object per reply
    Json,
}

impl From<roundtable_domain::OutputFormat> for OutputFormat {
    fn from(format: roundtable_domain::OutputFormat) -> Self {
        match format {
            roundtable_domain::OutputFormat::Text => OutputFormat::Text,
            roundtable_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Session mode override
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Every member answers once per message
    Single,
    /// Members take turns over decaying rounds
    Multi,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => SessionMode::SingleResponder,
            ModeArg::Multi => SessionMode::MultiResponder,
        }
    }
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Group chat with a roster of personas that take turns replying")]
#[command(long_about = r#"
Roundtable runs a group chat between you and a roster of personas.

Every message you send starts a sequence of rounds. In each round the
personas are ordered by priority and each one speaks with a probability
that decays round by round, so conversations taper off on their own.
With a single persona (or --mode single) each member answers exactly once.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_* environment variables
2. --config <path>        Explicit config file
3. ./roundtable.toml      Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "What is the nature of genius?"
  roundtable -m einstein -m turing "Can machines think?"
  roundtable -m monroe
"#)]
pub struct Cli {
    /// Messages to send in order (interactive chat when omitted)
    pub messages: Vec<String>,

    /// Personas to seat at the table, by name or alias (repeatable; all when omitted)
    #[arg(short, long, value_name = "PERSONA")]
    pub member: Vec<String>,

    /// Override the session mode derived from the roster size
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Session id to use
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Output format (defaults to [output] format, then text)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Fixed RNG seed for reproducible turn taking
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore global, project and environment configuration
    /// (a `--config` file is still read on its own)
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the configured personas and exit
    #[arg(long)]
    pub list_personas: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_invocation() {
        let cli = Cli::try_parse_from([
            "roundtable",
            "-m",
            "einstein",
            "--member",
            "turing",
            "--mode",
            "single",
            "-vv",
            "hello",
            "bye",
        ])
        .unwrap();
        assert_eq!(cli.member, vec!["einstein", "turing"]);
        assert_eq!(cli.mode.map(SessionMode::from), Some(SessionMode::SingleResponder));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.messages, vec!["hello", "bye"]);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_parse_output_format() {
        let cli = Cli::try_parse_from(["roundtable", "-o", "json"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.messages.is_empty());
    }
}
