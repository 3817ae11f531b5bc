use uuid::Uuid;

use super::message::{Message, MessageId, Sender};

/// Ordered transcript of one chat session
///
/// Messages are only ever appended. The session id is generated once and
/// sent with every request made for this conversation.
#[derive(Debug, Clone)]
pub struct Conversation {
    session_id: String,
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    /// Create an empty conversation with a fresh session id
    pub fn new() -> Self {
        Self::with_session_id(Uuid::new_v4().simple().to_string())
    }

    /// Create an empty conversation bound to an existing session id
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            next_id: 0,
        }
    }

    /// Create a conversation that opens with a bot greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Sender::Bot, greeting, false);
        conversation
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids are assigned in insertion order
        self.messages
            .binary_search_by_key(&id, Message::id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    pub(crate) fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages
            .binary_search_by_key(&id, Message::id)
            .ok()
            .map(|idx| &mut self.messages[idx])
    }

    /// The message still receiving fragments, if any
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_streaming())
    }

    /// Append a message and return its id
    pub(crate) fn push(&mut self, sender: Sender, content: impl Into<String>, streaming: bool) -> MessageId {
        debug_assert!(
            !streaming || self.streaming_message().is_none(),
            "only one message may stream at a time"
        );

        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        self.messages.push(Message::new(id, sender, content, streaming));
        id
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
