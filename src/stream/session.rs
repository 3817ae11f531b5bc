//! Chat session driver
//!
//! Connects a [`ChatTransport`] to a [`StreamAssembler`]: one call to
//! [`ChatSession::send`] runs a whole exchange, reporting every message
//! change to an [`ExchangeObserver`] as it happens.
//!
//! ```ignore
//! let mut session = ChatSession::new(&ChatConfig::from_env()?)?;
//! let outcome = session.send("Which courses are available?", &mut ()).await?;
//! ```

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::assembler::StreamAssembler;
use super::http::HttpTransport;
use super::transport::{ChatRequest, ChatTransport};
use crate::config::ChatConfig;
use crate::conversation::{Conversation, Message, MessageId};
use crate::core::{ChatError, ChatResult, TransportError};

/// Receives conversation updates while an exchange runs
///
/// Every callback sees the message after the change was applied. Renders
/// may be skipped freely; the last update of an exchange always carries the
/// final state.
pub trait ExchangeObserver: Send {
    /// A message was added or changed
    fn on_update(&mut self, _message: &Message) {}

    /// The exchange started (`true`) or ended (`false`)
    fn on_loading(&mut self, _loading: bool) {}
}

/// Observer that ignores everything
impl ExchangeObserver for () {}

/// How an exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The reply streamed to completion
    Completed(MessageId),
    /// The stream ended before any text arrived
    NoResponse,
    /// The transport failed; the id is the error message
    Failed(MessageId),
    /// Cancelled by the caller; the id is the kept partial reply, if any
    Cancelled(Option<MessageId>),
}

enum Step<T> {
    Cancelled,
    Ready(T),
}

/// One chat conversation bound to a transport
pub struct ChatSession {
    assembler: StreamAssembler,
    transport: Arc<dyn ChatTransport>,
}

impl ChatSession {
    /// Create a session that talks HTTP to the configured endpoint
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let transport = HttpTransport::new(config)?;
        let conversation = match &config.greeting {
            Some(greeting) => Conversation::with_greeting(greeting.clone()),
            None => Conversation::new(),
        };

        tracing::info!(
            "Chat session {} created for {}",
            conversation.session_id(),
            config.endpoint
        );

        Ok(Self::with_transport(conversation, Arc::new(transport)))
    }

    /// Create a session over any transport
    pub fn with_transport(conversation: Conversation, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            assembler: StreamAssembler::new(conversation),
            transport,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        self.assembler.conversation()
    }

    pub fn session_id(&self) -> &str {
        self.assembler.conversation().session_id()
    }

    pub fn is_loading(&self) -> bool {
        self.assembler.is_loading()
    }

    /// Run one exchange to completion or failure
    ///
    /// Transport failures do not surface as `Err`: they become a bot
    /// message and [`ExchangeOutcome::Failed`]. `Err` means the query was
    /// rejected and nothing changed.
    pub async fn send(
        &mut self,
        query: &str,
        observer: &mut dyn ExchangeObserver,
    ) -> ChatResult<ExchangeOutcome> {
        self.send_with_cancel(query, &CancellationToken::new(), observer)
            .await
    }

    /// Like [`send`](Self::send), but stops early when `cancel` fires
    pub async fn send_with_cancel(
        &mut self,
        query: &str,
        cancel: &CancellationToken,
        observer: &mut dyn ExchangeObserver,
    ) -> ChatResult<ExchangeOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChatError::EmptyQuery);
        }

        let request = self.assembler.begin(query)?;
        if let Some(user_message) = self.assembler.conversation().last() {
            observer.on_update(user_message);
        }
        observer.on_loading(true);

        let outcome = self.run_exchange(&request, cancel, observer).await;

        observer.on_loading(false);
        tracing::info!("Exchange finished: {:?}", outcome);
        Ok(outcome)
    }

    async fn run_exchange(
        &mut self,
        request: &ChatRequest,
        cancel: &CancellationToken,
        observer: &mut dyn ExchangeObserver,
    ) -> ExchangeOutcome {
        let transport = Arc::clone(&self.transport);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => Step::Cancelled,
            result = transport.open(request) => Step::Ready(result),
        };

        let mut fragments = match opened {
            Step::Cancelled => return self.cancelled(observer),
            Step::Ready(Err(error)) => return self.failed(&error, transport.endpoint(), observer),
            Step::Ready(Ok(fragments)) => fragments,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                next = fragments.next() => Step::Ready(next),
            };

            match next {
                Step::Cancelled => return self.cancelled(observer),
                Step::Ready(Some(Ok(fragment))) => {
                    if let Some(message) = self.assembler.push_fragment(&fragment) {
                        observer.on_update(message);
                    }
                }
                Step::Ready(Some(Err(error))) => {
                    return self.failed(&error, transport.endpoint(), observer)
                }
                Step::Ready(None) => break,
            }
        }

        match self.assembler.complete() {
            Some(message) => {
                observer.on_update(message);
                ExchangeOutcome::Completed(message.id())
            }
            None => ExchangeOutcome::NoResponse,
        }
    }

    fn failed(
        &mut self,
        error: &TransportError,
        endpoint: &str,
        observer: &mut dyn ExchangeObserver,
    ) -> ExchangeOutcome {
        // Look up the partial reply before the assembler finishes it
        let partial = self
            .assembler
            .conversation()
            .streaming_message()
            .map(Message::id);

        let error_id = match self.assembler.fail(error, endpoint) {
            Some(message) => message.id(),
            None => return ExchangeOutcome::NoResponse,
        };

        if let Some(message) = partial.and_then(|id| self.assembler.conversation().get(id)) {
            observer.on_update(message);
        }
        if let Some(message) = self.assembler.conversation().get(error_id) {
            observer.on_update(message);
        }

        ExchangeOutcome::Failed(error_id)
    }

    fn cancelled(&mut self, observer: &mut dyn ExchangeObserver) -> ExchangeOutcome {
        match self.assembler.cancel() {
            Some(message) => {
                observer.on_update(message);
                ExchangeOutcome::Cancelled(Some(message.id()))
            }
            None => ExchangeOutcome::Cancelled(None),
        }
    }
}
