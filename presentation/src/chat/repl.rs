//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::ReplyFollower;
use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use roundtable_application::{ResponderBackend, SessionError, SessionRegistry};
use roundtable_domain::{Reply, SessionId};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that end the interactive loop
#[derive(Error, Debug)]
pub enum ReplError {
    #[error("Line editor failed: {0}")]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Quit,
}

/// Interactive chat REPL bound to one session
pub struct ChatRepl<B: ResponderBackend + ?Sized + 'static> {
    registry: Arc<SessionRegistry<B>>,
    session: SessionId,
    format: OutputFormat,
    follower: ReplyFollower,
}

impl<B: ResponderBackend + ?Sized + 'static> ChatRepl<B> {
    /// Create a new ChatRepl
    pub fn new(registry: Arc<SessionRegistry<B>>, session: SessionId) -> Self {
        Self {
            registry,
            session,
            format: OutputFormat::Text,
            follower: ReplyFollower::default(),
        }
    }

    /// Set the reply output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set how replies are polled
    pub fn with_follower(mut self, follower: ReplyFollower) -> Self {
        self.follower = follower;
        self
    }

    /// Send each message in turn, printing replies until the session is idle
    pub async fn run_batch(&self, messages: &[String]) -> Result<usize, SessionError> {
        let mut total = 0;
        for message in messages {
            total += self.send(message).await?;
        }
        Ok(total)
    }

    /// Run the interactive REPL until EOF or `/quit`
    pub async fn run(&self) -> Result<(), ReplError> {
        let mut rl = DefaultEditor::new()?;

        let history_path = history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        if self.format == OutputFormat::Text {
            println!("{}", ConsoleFormatter::welcome(&self.registry.status(&self.session)?));
        }
        let prompt = match self.format {
            OutputFormat::Text => ">>> ",
            OutputFormat::Json => "",
        };

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line)? == CommandOutcome::Quit {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.send(line).await?;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    if self.format == OutputFormat::Text {
                        println!("Bye!");
                    }
                    break;
                }
                Err(err) => {
                    if let Some(ref path) = history_path {
                        let _ = rl.save_history(path);
                    }
                    return Err(err.into());
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn send(&self, message: &str) -> Result<usize, SessionError> {
        self.registry.trigger(&self.session, message)?;
        let format = self.format;
        self.follower
            .follow(&self.registry, &self.session, |reply| {
                println!("{}", render(format, reply));
            })
            .await
    }

    /// Handle slash commands
    fn handle_command(&self, cmd: &str) -> Result<CommandOutcome, SessionError> {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return Ok(CommandOutcome::Quit);
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?     - Show this help");
                println!("  /status           - Show the session state");
                println!("  /transcript       - Show the whole conversation");
                println!("  /personas         - Show the persona catalog");
                println!("  /quit, /exit, /q  - Exit chat");
                println!();
            }
            "/status" => {
                println!("{}", ConsoleFormatter::format_status(&self.registry.status(&self.session)?));
            }
            "/transcript" => {
                println!(
                    "{}",
                    ConsoleFormatter::format_transcript(&self.registry.transcript(&self.session)?)
                );
            }
            "/personas" => {
                println!("{}", ConsoleFormatter::format_personas(self.registry.catalog()));
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        Ok(CommandOutcome::Continue)
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("roundtable").join("history.txt"))
}

fn render(format: OutputFormat, reply: &Reply) -> String {
    match format {
        OutputFormat::Text => ConsoleFormatter::format_reply(reply),
        OutputFormat::Json => ConsoleFormatter::format_reply_json(reply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roundtable_application::{BackendError, DriverParams};
    use roundtable_domain::{Entry, Origin, Persona, PersonaCatalog, RosterSpec};
    use std::time::Duration;

    struct FixedBackend;

    #[async_trait]
    impl ResponderBackend for FixedBackend {
        async fn generate(
            &self,
            persona_prompt: &str,
            _transcript: &[Entry],
        ) -> Result<String, BackendError> {
            Ok(format!("{persona_prompt}: noted"))
        }
    }

    fn repl() -> ChatRepl<FixedBackend> {
        let catalog = PersonaCatalog::new(vec![Persona::new("A", "A")]);
        let registry = Arc::new(SessionRegistry::new(
            catalog,
            Arc::new(FixedBackend),
            DriverParams::immediate(2),
        ));
        let id = registry
            .start_or_resolve_session(None, &RosterSpec::everyone())
            .unwrap();
        ChatRepl::new(registry, id)
            .with_format(OutputFormat::Json)
            .with_follower(ReplyFollower::new(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_run_batch_sends_messages_in_order() {
        let repl = repl();
        // One persona over the whole catalog is still a group chat
        let replies = repl
            .run_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert!(replies <= 8);

        let transcript = repl.registry.transcript(&repl.session).unwrap();
        let externals: Vec<&str> = transcript
            .iter()
            .filter(|e| e.origin == Origin::External)
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(externals, vec!["first", "second"]);
        assert_eq!(transcript.len(), 3 + replies);
    }

    #[tokio::test]
    async fn test_commands() {
        let repl = repl();
        assert_eq!(repl.handle_command("/status").unwrap(), CommandOutcome::Continue);
        assert_eq!(repl.handle_command("/bogus").unwrap(), CommandOutcome::Continue);
        assert_eq!(repl.handle_command("/q").unwrap(), CommandOutcome::Quit);
    }

    #[test]
    fn test_history_lives_under_roundtable() {
        if let Some(path) = history_path() {
            assert!(path.ends_with("roundtable/history.txt"));
        }
    }

    #[test]
    fn test_session_errors_pass_through() {
        let id = SessionId::new("conv_gone");
        let error = ReplError::from(SessionError::NotFound(id.clone()));
        assert_eq!(error.to_string(), SessionError::NotFound(id).to_string());
        assert!(matches!(
            ReplError::from(ReadlineError::Eof),
            ReplError::Readline(_)
        ));
    }

    #[test]
    fn test_render_json() {
        let line = render(OutputFormat::Json, &Reply::new("A", "hi"));
        assert_eq!(line, r#"{"identity":"A","content":"hi"}"#);
    }
}
