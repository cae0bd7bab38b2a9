//! Prompt templates for session framing and backend context

/// Label the external participant's messages carry when shown to a backend
pub const EXTERNAL_LABEL: &str = "User";

/// Templates for the fixed texts of a conversation
pub struct PromptTemplate;

impl PromptTemplate {
    /// Opening system entry of a multi-responder session
    pub fn group_chat_opening(participants: &[&str]) -> String {
        format!(
            r#"IMPORTANT CONVERSATION RULES:
1. This is a group chat with multiple participants.
2. Each participant should respond only as themselves.
3. Never include '{EXTERNAL_LABEL}:' or name prefixes.
4. Participants: {}. Chat Topic: General Discussion."#,
            participants.join(", ")
        )
    }

    /// Opening system entry of a single-responder session
    pub fn one_on_one_opening(responder: &str) -> String {
        format!(
            "This is a one-on-one conversation between the user and {responder}. \
             Respond naturally as yourself."
        )
    }

    /// How an external message is presented to the backend
    pub fn external_message(text: &str) -> String {
        format!("{EXTERNAL_LABEL}: {text}")
    }

    /// Placeholder entry written when a responder's backend call fails
    pub fn backend_failure(error: &str) -> String {
        format!("[Error in generating response: {error}]")
    }
}
