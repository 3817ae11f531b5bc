//! Chat client configuration
//!
//! Values come from the environment with builder-style overrides:
//!
//! ```ignore
//! let config = ChatConfig::from_env()?
//!     .with_endpoint("http://localhost:9000/chat")
//!     .without_greeting();
//! ```

use std::env;
use std::time::Duration;

use crate::core::{ChatError, ChatResult};

/// Default chat backend endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";
/// Default connect timeout in milliseconds
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Message shown before the first exchange
pub const DEFAULT_GREETING: &str =
    "Hello! I am a chatbot assistant for these professional services. How can I assist you?";

/// Settings for a chat session and its transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// URL the query is POSTed to
    pub endpoint: String,
    /// Time allowed to establish the connection (the stream itself is unbounded)
    pub connect_timeout: Duration,
    /// Bot message seeded into a new conversation
    pub greeting: Option<String>,
}

impl ChatConfig {
    /// Load configuration from environment variables
    ///
    /// Reads from:
    /// - `CHAT_API_ENDPOINT` (optional, defaults to the local backend)
    /// - `CHAT_CONNECT_TIMEOUT_MS` (optional, defaults to 10000)
    /// - `CHAT_GREETING` (optional; an empty value disables the greeting)
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ChatResult<Self> {
        let endpoint = lookup("CHAT_API_ENDPOINT")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let connect_timeout = match lookup("CHAT_CONNECT_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|_| {
                    ChatError::Config(format!(
                        "CHAT_CONNECT_TIMEOUT_MS must be a whole number of milliseconds, got '{}'",
                        raw
                    ))
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        };

        let greeting = match lookup("CHAT_GREETING") {
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(text),
            None => Some(DEFAULT_GREETING.to_string()),
        };

        tracing::debug!("Chat endpoint: {}", endpoint);

        Ok(Self {
            endpoint,
            connect_timeout,
            greeting,
        })
    }

    /// Set the chat endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the greeting message
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    /// Start conversations without a greeting
    pub fn without_greeting(mut self) -> Self {
        self.greeting = None;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("CHAT_API_ENDPOINT", "http://example.test/chat"),
            ("CHAT_CONNECT_TIMEOUT_MS", "250"),
            ("CHAT_GREETING", "Hi"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "http://example.test/chat");
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.greeting.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_empty_greeting_disables_it() {
        let config = ChatConfig::from_lookup(lookup_from(&[("CHAT_GREETING", "  ")])).unwrap();
        assert!(config.greeting.is_none());
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let err = ChatConfig::from_lookup(lookup_from(&[("CHAT_CONNECT_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ChatConfig::default()
            .with_endpoint("http://localhost:1/chat")
            .with_connect_timeout(Duration::from_secs(1))
            .without_greeting();

        assert_eq!(config.endpoint, "http://localhost:1/chat");
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert!(config.greeting.is_none());
    }
}
