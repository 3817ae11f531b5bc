//! HTTP chat transport
//!
//! POSTs `{query, session_id}` as JSON and treats every chunk of the
//! response body as one fragment. No framing is assumed beyond raw text.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};

use super::transport::{ChatRequest, ChatTransport, FragmentStream};
use crate::config::ChatConfig;
use crate::core::{ChatError, ChatResult, TransportError};

/// Chat transport over plain HTTP with a chunked text body
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport from configuration
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        Self::with_timeout(&config.endpoint, config.connect_timeout)
    }

    /// Create a transport for an endpoint with a connect timeout
    pub fn with_timeout(endpoint: impl Into<String>, connect_timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Create a transport with an existing client
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<FragmentStream, TransportError> {
        tracing::debug!(
            "POST {} (session {}, {} chars)",
            self.endpoint,
            request.session_id,
            request.query.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(TransportError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Backend error status: {}", status);
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Err(TransportError::MissingBody);
        }

        tracing::info!("Streaming response started");

        let mut body = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut decoder = Utf8Decoder::default();
            let mut chunk_count: usize = 0;

            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        chunk_count += 1;
                        let text = decoder.decode(&bytes);
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Stream broke after {} chunks: {}", chunk_count, e);
                        yield Err(TransportError::Body(e));
                        return;
                    }
                }
            }

            let rest = decoder.finish();
            if !rest.is_empty() {
                yield Ok(rest);
            }

            tracing::info!("Stream ended after {} chunks", chunk_count);
        };

        Ok(Box::pin(stream))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Incremental UTF-8 decoder
///
/// A multi-byte character split across two chunks is held back until the
/// rest of it arrives. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // incomplete tail, wait for the next chunk
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is left at end of stream
    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_passes_ascii_through() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(b"Hello"), "Hello");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decoder_joins_split_character() {
        let bytes = "café".as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() - 1);

        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(head), "caf");
        assert_eq!(decoder.decode(tail), "é");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_decoder_flushes_truncated_tail() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[b'x', 0xE2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_transport_reports_endpoint() {
        let transport =
            HttpTransport::with_timeout("http://127.0.0.1:9/chat", Duration::from_millis(50)).unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9/chat");
    }
}
