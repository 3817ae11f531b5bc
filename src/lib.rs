//! Streaming chat assistant client
//!
//! - [`stream`]: send a query, assemble the streamed reply into one message
//! - [`markdown`]: convert finished replies into typed markup
//! - [`conversation`]: the transcript those two operate on
//! - [`cli`]: terminal front end
//!
//! ```ignore
//! use chatmark::{config::ChatConfig, stream::ChatSession};
//!
//! let mut session = ChatSession::new(&ChatConfig::from_env()?)?;
//! session.send("What do you teach?", &mut ()).await?;
//! ```

pub mod cli;
pub mod config;
pub mod conversation;
pub mod core;
pub mod logging;
pub mod markdown;
pub mod stream;

pub use crate::core::{ChatError, ChatResult, TransportError};
