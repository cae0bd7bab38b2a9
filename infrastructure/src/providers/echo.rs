//! Offline backend for demos and smoke tests

use async_trait::async_trait;
use roundtable_application::{BackendError, ResponderBackend};
use roundtable_domain::{Entry, Origin};

/// Answers from the transcript alone, without any network access.
///
/// The reply quotes the latest external message and counts how many
/// responder entries followed it.
#[derive(Debug, Default)]
pub struct EchoBackend;

impl EchoBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponderBackend for EchoBackend {
    async fn generate(
        &self,
        _persona_prompt: &str,
        transcript: &[Entry],
    ) -> Result<String, BackendError> {
        let Some(position) = transcript
            .iter()
            .rposition(|e| e.origin == Origin::External)
        else {
            return Ok("Nobody has said anything yet.".to_string());
        };

        let heard = &transcript[position].content;
        let replies = transcript[position + 1..]
            .iter()
            .filter(|e| e.origin.responder().is_some())
            .count();
        Ok(match replies {
            0 => format!("I heard \"{heard}\"."),
            n => format!("I heard \"{heard}\" too, after {n} others answered."),
        })
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quotes_latest_external_message() {
        let transcript = vec![
            Entry::system("rules"),
            Entry::external("old"),
            Entry::responder("A", "first"),
            Entry::external("hi"),
        ];
        let reply = EchoBackend::new().generate("p", &transcript).await.unwrap();
        assert_eq!(reply, "I heard \"hi\".");
    }

    #[tokio::test]
    async fn test_counts_replies_since_message() {
        let transcript = vec![
            Entry::external("hi"),
            Entry::responder("A", "x"),
            Entry::responder("B", "y"),
        ];
        let reply = EchoBackend::new().generate("p", &transcript).await.unwrap();
        assert_eq!(reply, "I heard \"hi\" too, after 2 others answered.");
    }

    #[tokio::test]
    async fn test_empty_transcript() {
        let reply = EchoBackend::new().generate("p", &[]).await.unwrap();
        assert_eq!(reply, "Nobody has said anything yet.");
    }
}
