use crate::api::models::{ConversationMessage, Role};

/// Text of the transient assistant turn shown while a request is in flight
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Assistant turn recorded when a request fails
pub const FAILED_TURN_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Local-only turn (typing indicator); never sent to the backend
    pub placeholder: bool,
}

/// Transcript of the chat with the assistant
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of real (non-placeholder) turns
    pub fn turns(&self) -> usize {
        self.messages.iter().filter(|m| !m.placeholder).count()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into(), false);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into(), false);
    }

    pub fn push_placeholder(&mut self) {
        self.push(Role::Assistant, THINKING_PLACEHOLDER.to_string(), true);
    }

    pub fn clear_placeholders(&mut self) {
        self.messages.retain(|m| !m.placeholder);
    }

    /// Drop the placeholder along with the user turn it was answering
    pub fn abandon_pending(&mut self) {
        let Some(index) = self.messages.iter().rposition(|m| m.placeholder) else {
            return;
        };
        self.messages.remove(index);
        if index > 0 && self.messages[index - 1].role == Role::User {
            self.messages.remove(index - 1);
        }
        self.clear_placeholders();
    }

    /// History as the backend expects it, placeholders excluded
    pub fn history(&self) -> Vec<ConversationMessage> {
        self.messages
            .iter()
            .filter(|m| !m.placeholder)
            .map(|m| ConversationMessage::new(m.role, m.content.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, role: Role, content: String, placeholder: bool) {
        self.messages.push(ChatMessage {
            role,
            content,
            placeholder,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_skips_placeholders() {
        let mut conversation = Conversation::new();
        conversation.push_user("phone under 20k");
        conversation.push_placeholder();

        let history = conversation.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.turns(), 1);

        conversation.clear_placeholders();
        conversation.push_assistant("Here are some options");
        assert_eq!(conversation.history().len(), 2);
        assert!(conversation.messages().iter().all(|m| !m.placeholder));
    }

    #[test]
    fn test_abandon_pending_drops_unanswered_turn() {
        let mut conversation = Conversation::new();
        conversation.push_user("phone");
        conversation.push_assistant("Here you go");
        conversation.push_user("laptop");
        conversation.push_placeholder();

        conversation.abandon_pending();
        assert_eq!(
            conversation.history(),
            vec![
                ConversationMessage::new(Role::User, "phone"),
                ConversationMessage::new(Role::Assistant, "Here you go"),
            ]
        );

        // Nothing in flight, nothing to drop
        conversation.abandon_pending();
        assert_eq!(conversation.turns(), 2);
    }
}
