//! Streaming exchanges with the chat backend
//!
//! - [`ChatTransport`] delivers reply fragments ([`HttpTransport`] over HTTP)
//! - [`StreamAssembler`] folds fragments into one growing bot message
//! - [`ChatSession`] drives both for a single exchange at a time

mod assembler;
mod http;
mod session;
mod transport;

pub use assembler::{failure_text, StreamAssembler};
pub use http::HttpTransport;
pub use session::{ChatSession, ExchangeObserver, ExchangeOutcome};
pub use transport::{ChatRequest, ChatTransport, FragmentStream};
