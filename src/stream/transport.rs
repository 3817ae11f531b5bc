//! Transport abstraction for the chat backend

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use crate::core::TransportError;

/// Decoded text fragments in arrival order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Body POSTed to the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.into(),
        }
    }
}

/// Source of streamed bot replies
///
/// `open` resolves once the backend has accepted the request; the returned
/// stream then yields text fragments until the reply ends. Any error, from
/// `open` or from the stream, ends the exchange.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> Result<FragmentStream, TransportError>;

    /// Endpoint named in user-facing failure messages
    fn endpoint(&self) -> &str;
}
