//! Error types
//!
//! Transport failures are kept separate from caller errors: a
//! [`TransportError`] always ends up as a visible bot message, while a
//! [`ChatError`] is returned to whoever tried to start the exchange.

use thiserror::Error;

/// Result alias used throughout the crate
pub type ChatResult<T> = Result<T, ChatError>;

/// Failures talking to the chat backend
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never got a response (DNS, refused, TLS, timeout)
    #[error("failed to reach chat backend: {0}")]
    Connect(#[source] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("chat backend returned HTTP {status}")]
    Status { status: u16 },

    /// The backend answered without a readable body
    #[error("chat backend response has no body")]
    MissingBody,

    /// The body stream broke after it started
    #[error("chat response stream interrupted: {0}")]
    Body(#[source] reqwest::Error),
}

/// Errors returned to callers of the chat session
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("query is empty")]
    EmptyQuery,

    /// A previous exchange is still streaming
    #[error("an exchange is already in flight")]
    ExchangeInFlight,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
