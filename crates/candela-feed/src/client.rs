//! Websocket client for the realtime ticker endpoint.

use crate::rpc::Request;
use crate::stream::{TickStream, tick_stream};
use async_trait::async_trait;
use futures::SinkExt;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

/// Default realtime endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://ws.lightstream.bitflyer.com/json-rpc";

/// Default ticker channel prefix; the channel is `<prefix>_<product_code>`.
pub const DEFAULT_TOPIC_PREFIX: &str = "lightning_ticker";

/// Configuration for the feed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Websocket endpoint URL.
    pub endpoint: String,
    /// Channel prefix joined with the product code.
    pub topic_prefix: String,
    /// Timeout for the websocket handshake.
    pub connect_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    /// Returns the channel name for `product_code`.
    #[must_use]
    pub fn channel(&self, product_code: &str) -> String {
        format!("{}_{}", self.topic_prefix, product_code)
    }
}

/// Errors that can occur while connected to the feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The websocket handshake failed.
    #[error("Connection to {endpoint} failed: {source}")]
    Connect {
        /// Endpoint that was dialed.
        endpoint: String,
        /// Underlying websocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// The websocket handshake did not complete in time.
    #[error("Connection to {endpoint} timed out after {timeout:?}")]
    ConnectTimeout {
        /// Endpoint that was dialed.
        endpoint: String,
        /// Configured timeout.
        timeout: Duration,
    },

    /// The subscribe request could not be encoded.
    #[error("Failed to encode subscribe request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The subscribe request could not be sent.
    #[error("Failed to subscribe to {channel}: {source}")]
    Subscribe {
        /// Channel being subscribed.
        channel: String,
        /// Underlying websocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// Reading from the websocket failed.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<tungstenite::Error>),

    /// The server closed the connection.
    #[error("Connection closed by server{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Closed {
        /// Close reason, if one was sent.
        reason: Option<String>,
    },
}

/// Exponential backoff for reconnecting to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum consecutive failed connections before giving up.
    pub max_retries: u32,
    /// Base wait in milliseconds, doubled for every failed session.
    pub base_delay_ms: u64,
    /// Longest wait between sessions, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl ReconnectPolicy {
    /// Shortest wait between sessions, whatever the configuration.
    pub const MIN_DELAY_MS: u64 = 100;

    /// Returns the wait before reconnect attempt `attempt` (1-based).
    ///
    /// The wait doubles with every failed session until it reaches
    /// `max_delay_ms`. It is then spread over a band of ±25% keyed by the
    /// attempt number, so consecutive waits differ without an RNG.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let doubled = self.base_delay_ms.saturating_mul(1 << attempt.min(10));
        let ceiling = doubled.min(self.max_delay_ms);

        let band = ceiling / 4;
        let spread = if band == 0 {
            ceiling
        } else {
            ceiling - band + (u64::from(attempt) * 17) % (band * 2)
        };
        Duration::from_millis(spread.max(Self::MIN_DELAY_MS))
    }

    /// Returns whether another attempt is allowed after `failures`
    /// consecutive failures.
    #[must_use]
    pub const fn allows(&self, failures: u32) -> bool {
        failures <= self.max_retries
    }
}

/// A source of tick streams for one product.
///
/// Each call to [`subscribe`](TickSource::subscribe) opens a fresh
/// subscription; the returned stream ends after yielding an error.
#[async_trait]
pub trait TickSource: Send + Sync {
    /// Opens a subscription for `product_code`.
    async fn subscribe(&self, product_code: &str) -> Result<TickStream, FeedError>;
}

/// Websocket client for the realtime ticker endpoint.
#[derive(Debug, Clone, Default)]
pub struct FeedClient {
    config: FeedConfig,
}

impl FeedClient {
    /// Creates a new client with the given configuration.
    #[must_use]
    pub const fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Connects and subscribes to the ticker channel of `product_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails or times out, or if the
    /// subscribe request cannot be sent.
    pub async fn connect(&self, product_code: &str) -> Result<TickStream, FeedError> {
        let endpoint = self.config.endpoint.as_str();
        let channel = self.config.channel(product_code);

        let handshake = tokio::time::timeout(self.config.connect_timeout, connect_async(endpoint))
            .await
            .map_err(|_| FeedError::ConnectTimeout {
                endpoint: endpoint.to_string(),
                timeout: self.config.connect_timeout,
            })?;
        let (mut socket, response) = handshake.map_err(|e| FeedError::Connect {
            endpoint: endpoint.to_string(),
            source: Box::new(e),
        })?;
        tracing::debug!(endpoint, status = %response.status(), "websocket connected");

        let request = serde_json::to_string(&Request::subscribe(channel.as_str(), 1))?;
        socket
            .send(Message::Text(request))
            .await
            .map_err(|e| FeedError::Subscribe {
                channel: channel.clone(),
                source: Box::new(e),
            })?;
        tracing::info!(endpoint, channel = %channel, "subscribed to ticker channel");

        Ok(Box::pin(tick_stream(socket, channel)))
    }
}

#[async_trait]
impl TickSource for FeedClient {
    async fn subscribe(&self, product_code: &str) -> Result<TickStream, FeedError> {
        self.connect(product_code).await
    }
}
