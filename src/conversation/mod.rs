//! Conversation state
//!
//! A [`Conversation`] is an ordered, append-only list of [`Message`]s plus the
//! session identifier sent with every request made on its behalf.

mod history;
mod message;

pub use history::Conversation;
pub use message::{Message, MessageId, MessageView, Sender};
