//! Message types for the chat transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markdown::{self, RenderedBlock};

/// Identifier of a message within its conversation
///
/// Assigned in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Label shown above a message bubble
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You:",
            Sender::Bot => "Bot:",
        }
    }
}

/// One unit of conversation
///
/// Content only grows while `streaming` is true and is frozen once the
/// message is finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    content: String,
    streaming: bool,
    created_at: DateTime<Utc>,
}

/// How a message should be presented
#[derive(Debug, Clone, PartialEq)]
pub enum MessageView<'a> {
    /// Show the text verbatim (user input, or bot text still arriving)
    Raw(&'a str),
    /// Finished bot text converted to structured markup
    Rendered(RenderedBlock),
}

impl Message {
    pub(crate) fn new(id: MessageId, sender: Sender, content: impl Into<String>, streaming: bool) -> Self {
        Self {
            id,
            sender,
            content: content.into(),
            streaming,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether fragments are still arriving for this message
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a fragment to a streaming message
    ///
    /// Returns false (and leaves the content untouched) if the message is
    /// already finished.
    pub(crate) fn append(&mut self, fragment: &str) -> bool {
        if !self.streaming {
            return false;
        }
        self.content.push_str(fragment);
        true
    }

    /// Mark the message as finished. Terminal.
    pub(crate) fn finish(&mut self) {
        self.streaming = false;
    }

    /// Presentation of this message
    ///
    /// Bot text is only converted once streaming has ended; partial text is
    /// shown as-is.
    pub fn view(&self) -> MessageView<'_> {
        match self.sender {
            Sender::Bot if !self.streaming => MessageView::Rendered(markdown::convert(&self.content)),
            _ => MessageView::Raw(&self.content),
        }
    }
}
