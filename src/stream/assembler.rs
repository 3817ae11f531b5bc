//! Stream assembly
//!
//! Turns the fragments of one exchange into one growing bot message. The
//! assembler is driven by events and never awaits anything itself:
//!
//! ```text
//!            begin             first fragment          end of stream
//!   Idle ──────────► Awaiting ────────────────► Streaming ─────────► Idle
//!     ▲                 │ failure / end            │ failure / cancel
//!     └─────────────────┴──────────────────────────┘
//! ```
//!
//! Only one exchange can be in flight; `begin` is rejected until the current
//! one reaches a terminal state.

use crate::conversation::{Conversation, Message, MessageId, Sender};
use crate::core::{ChatError, ChatResult, TransportError};

use super::transport::ChatRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Idle,
    /// Request sent, no fragment yet
    Awaiting,
    Streaming(MessageId),
}

/// Builds bot messages from streamed fragments
#[derive(Debug, Clone)]
pub struct StreamAssembler {
    conversation: Conversation,
    state: ExchangeState,
}

/// User-facing text for a failed exchange
pub fn failure_text(endpoint: &str) -> String {
    format!(
        "Error: Could not connect to the chat backend at {}. Is the server running?",
        endpoint
    )
}

impl StreamAssembler {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            state: ExchangeState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_conversation(self) -> Conversation {
        self.conversation
    }

    /// True from `begin` until the exchange ends
    pub fn is_loading(&self) -> bool {
        self.state != ExchangeState::Idle
    }

    /// Start an exchange: record the user message and build the request
    pub fn begin(&mut self, query: &str) -> ChatResult<ChatRequest> {
        if self.is_loading() {
            tracing::warn!("Rejected new exchange while another is in flight");
            return Err(ChatError::ExchangeInFlight);
        }

        let id = self.conversation.push(Sender::User, query, false);
        self.state = ExchangeState::Awaiting;
        tracing::info!("Exchange started (user message {})", id);

        Ok(ChatRequest::new(query, self.conversation.session_id()))
    }

    /// Apply one fragment in arrival order
    ///
    /// The first fragment creates the bot message; later ones are appended.
    /// Empty fragments and fragments outside an exchange are ignored.
    pub fn push_fragment(&mut self, fragment: &str) -> Option<&Message> {
        if fragment.is_empty() {
            return None;
        }

        match self.state {
            ExchangeState::Idle => {
                tracing::warn!("Dropped fragment received outside an exchange");
                None
            }
            ExchangeState::Awaiting => {
                let id = self.conversation.push(Sender::Bot, fragment, true);
                self.state = ExchangeState::Streaming(id);
                tracing::debug!("Bot message {} started ({} bytes)", id, fragment.len());
                self.conversation.get(id)
            }
            ExchangeState::Streaming(id) => {
                let message = self.conversation.get_mut(id)?;
                message.append(fragment);
                tracing::debug!(
                    "Bot message {} +{} bytes ({} total)",
                    id,
                    fragment.len(),
                    message.content().len()
                );
                Some(&*message)
            }
        }
    }

    /// End of stream. Returns the finished bot message, if one was created.
    pub fn complete(&mut self) -> Option<&Message> {
        match std::mem::replace(&mut self.state, ExchangeState::Idle) {
            ExchangeState::Streaming(id) => {
                let message = self.conversation.get_mut(id)?;
                message.finish();
                tracing::info!(
                    "Exchange complete (bot message {}, {} bytes)",
                    id,
                    message.content().len()
                );
                Some(&*message)
            }
            ExchangeState::Awaiting => {
                tracing::warn!("Exchange ended without any response text");
                None
            }
            ExchangeState::Idle => None,
        }
    }

    /// Transport failure. Any partial reply is kept as-is and finished; the
    /// failure is reported as a separate bot message, which is returned.
    pub fn fail(&mut self, error: &TransportError, endpoint: &str) -> Option<&Message> {
        match std::mem::replace(&mut self.state, ExchangeState::Idle) {
            ExchangeState::Idle => return None,
            ExchangeState::Streaming(id) => {
                if let Some(partial) = self.conversation.get_mut(id) {
                    partial.finish();
                }
            }
            ExchangeState::Awaiting => {}
        }

        tracing::error!("Exchange failed: {}", error);
        let id = self
            .conversation
            .push(Sender::Bot, failure_text(endpoint), false);
        self.conversation.get(id)
    }

    /// Abandon the exchange. A partial reply is finished with what arrived.
    pub fn cancel(&mut self) -> Option<&Message> {
        match std::mem::replace(&mut self.state, ExchangeState::Idle) {
            ExchangeState::Streaming(id) => {
                let message = self.conversation.get_mut(id)?;
                message.finish();
                tracing::info!("Exchange cancelled (bot message {} kept)", id);
                Some(&*message)
            }
            ExchangeState::Awaiting => {
                tracing::info!("Exchange cancelled before any response");
                None
            }
            ExchangeState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> StreamAssembler {
        StreamAssembler::new(Conversation::with_session_id("session-1"))
    }

    fn bot_messages(assembler: &StreamAssembler) -> Vec<&Message> {
        assembler
            .conversation()
            .messages()
            .iter()
            .filter(|m| m.sender() == Sender::Bot)
            .collect()
    }

    #[test]
    fn test_begin_appends_user_message_and_builds_request() {
        let mut asm = assembler();
        let request = asm.begin("hello").unwrap();

        assert_eq!(request, ChatRequest::new("hello", "session-1"));
        assert!(asm.is_loading());

        let user = asm.conversation().last().unwrap();
        assert_eq!(user.sender(), Sender::User);
        assert_eq!(user.content(), "hello");
        assert!(!user.is_streaming());
    }

    #[test]
    fn test_fragments_concatenate_in_order() {
        let sequences: &[&[&str]] = &[
            &["Hello"],
            &["Hel", "lo", ", ", "world"],
            &["* a\n", "1", ". b\n", "**bo", "ld**"],
            &["é", "ü", " ", "✓"],
        ];

        for fragments in sequences {
            let mut asm = assembler();
            asm.begin("q").unwrap();

            for fragment in fragments.iter() {
                let message = asm.push_fragment(fragment).unwrap();
                assert!(message.is_streaming());
            }

            let finished = asm.complete().unwrap();
            assert_eq!(finished.content(), fragments.concat());
            assert!(!finished.is_streaming());
            assert!(!asm.is_loading());
        }
    }

    #[test]
    fn test_single_bot_message_per_exchange() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        let first = asm.push_fragment("a").unwrap().id();
        let second = asm.push_fragment("b").unwrap().id();
        assert_eq!(first, second);
        assert_eq!(bot_messages(&asm).len(), 1);
    }

    #[test]
    fn test_empty_fragment_does_not_create_message() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        assert!(asm.push_fragment("").is_none());
        assert!(bot_messages(&asm).is_empty());
    }

    #[test]
    fn test_begin_rejected_while_in_flight() {
        let mut asm = assembler();
        asm.begin("first").unwrap();
        asm.push_fragment("partial").unwrap();

        let before = asm.conversation().len();
        let err = asm.begin("second").unwrap_err();
        assert!(matches!(err, ChatError::ExchangeInFlight));
        assert_eq!(asm.conversation().len(), before);

        // Also rejected before the first fragment arrives
        let mut asm = assembler();
        asm.begin("first").unwrap();
        assert!(asm.begin("second").is_err());
    }

    #[test]
    fn test_begin_allowed_after_completion() {
        let mut asm = assembler();
        asm.begin("first").unwrap();
        asm.push_fragment("reply").unwrap();
        asm.complete().unwrap();

        asm.begin("second").unwrap();
        asm.push_fragment("again").unwrap();
        assert_eq!(asm.conversation().streaming_message().unwrap().content(), "again");
    }

    #[test]
    fn test_failure_before_first_fragment() {
        let mut asm = assembler();
        asm.begin("q").unwrap();

        let error = asm
            .fail(&TransportError::Status { status: 500 }, "http://host/chat")
            .unwrap();
        assert_eq!(error.sender(), Sender::Bot);
        assert!(!error.is_streaming());
        assert!(error.content().contains("http://host/chat"));
        assert!(!asm.is_loading());
        assert_eq!(bot_messages(&asm).len(), 1);
    }

    #[test]
    fn test_failure_mid_stream_keeps_partial_content() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        asm.push_fragment("Hel").unwrap();
        let partial_id = asm.push_fragment("lo").unwrap().id();

        let error_id = asm
            .fail(&TransportError::MissingBody, "http://host/chat")
            .unwrap()
            .id();
        assert_ne!(partial_id, error_id);

        let bots = bot_messages(&asm);
        assert_eq!(bots.len(), 2);
        assert_eq!(bots[0].content(), "Hello");
        assert!(!bots[0].is_streaming());
        assert!(bots[1].content().starts_with("Error:"));
        assert!(!bots[1].is_streaming());
        assert!(asm.conversation().streaming_message().is_none());
    }

    #[test]
    fn test_end_without_fragments_creates_no_message() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        assert!(asm.complete().is_none());
        assert!(bot_messages(&asm).is_empty());
        assert!(!asm.is_loading());
    }

    #[test]
    fn test_fragment_outside_exchange_is_dropped() {
        let mut asm = assembler();
        assert!(asm.push_fragment("stray").is_none());
        assert!(asm.conversation().is_empty());
    }

    #[test]
    fn test_cancel_keeps_partial_reply() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        asm.push_fragment("partial").unwrap();

        let kept = asm.cancel().unwrap();
        assert_eq!(kept.content(), "partial");
        assert!(!kept.is_streaming());
        assert!(!asm.is_loading());
    }

    #[test]
    fn test_message_frozen_after_completion() {
        let mut asm = assembler();
        asm.begin("q").unwrap();
        asm.push_fragment("done").unwrap();
        asm.complete().unwrap();

        assert!(asm.push_fragment("late").is_none());
        assert_eq!(asm.conversation().last().unwrap().content(), "done");
    }
}
