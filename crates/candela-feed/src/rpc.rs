//! JSON-RPC 2.0 envelopes exchanged with the realtime endpoint.
//!
//! Inbound messages are decoded in two steps: the envelope first, with
//! `params` kept as raw JSON, then the params as a typed channel message only
//! when the method says it carries channel data.

use candela_types::Tick;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

/// JSON-RPC protocol version sent and expected.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name of channel data notifications.
pub const CHANNEL_MESSAGE_METHOD: &str = "channelMessage";

/// Method name of the subscribe request.
pub const SUBSCRIBE_METHOD: &str = "subscribe";

/// Errors that can occur while decoding an inbound message.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The message is not a JSON-RPC envelope.
    #[error("Malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// A channel notification without params.
    #[error("Channel message without params")]
    MissingParams,

    /// The params do not match the channel message shape.
    #[error("Malformed channel message: {0}")]
    Params(#[source] serde_json::Error),

    /// A channel message for a channel that was not subscribed.
    #[error("Unexpected channel '{got}' (subscribed to '{expected}')")]
    UnexpectedChannel {
        /// The subscribed channel.
        expected: String,
        /// The channel named in the message.
        got: String,
    },
}

/// Outgoing JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request<P> {
    /// Protocol version.
    pub jsonrpc: &'static str,
    /// Method name.
    pub method: &'static str,
    /// Method parameters.
    pub params: P,
    /// Request id, echoed by the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// Params of the subscribe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeParams {
    /// Channel name, e.g. `lightning_ticker_BTC_JPY`.
    pub channel: String,
}

impl Request<SubscribeParams> {
    /// Builds a subscribe request for `channel`.
    #[must_use]
    pub fn subscribe(channel: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: SUBSCRIBE_METHOD,
            params: SubscribeParams {
                channel: channel.into(),
            },
            id: Some(id),
        }
    }
}

/// Inbound envelope with params left undecoded.
#[derive(Debug, Deserialize)]
struct Envelope<'a> {
    #[serde(default)]
    method: Option<String>,
    #[serde(default, borrow)]
    params: Option<&'a RawValue>,
    #[serde(default, borrow)]
    error: Option<&'a RawValue>,
    #[serde(default)]
    id: Option<u64>,
}

/// Params of a channel data notification.
#[derive(Debug, Deserialize)]
struct ChannelMessage {
    channel: String,
    message: Tick,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A ticker update for the subscribed channel.
    Tick(Tick),
    /// Response to one of our requests.
    Response {
        /// The echoed request id.
        id: Option<u64>,
    },
    /// Error response from the endpoint.
    Error {
        /// The raw error object.
        detail: String,
    },
    /// Any other notification.
    Other {
        /// The method name, if present.
        method: Option<String>,
    },
}

/// Decodes one inbound text message for a subscription to `channel`.
///
/// # Errors
///
/// Returns an error if the text is not an envelope, or if a channel message
/// does not carry a ticker for `channel`.
pub fn decode(text: &str, channel: &str) -> Result<Inbound, DecodeError> {
    let envelope: Envelope<'_> = serde_json::from_str(text).map_err(DecodeError::Envelope)?;

    if let Some(error) = envelope.error {
        return Ok(Inbound::Error {
            detail: error.get().to_string(),
        });
    }

    match envelope.method.as_deref() {
        Some(CHANNEL_MESSAGE_METHOD) => {
            let params = envelope.params.ok_or(DecodeError::MissingParams)?;
            let message: ChannelMessage =
                serde_json::from_str(params.get()).map_err(DecodeError::Params)?;
            if message.channel != channel {
                return Err(DecodeError::UnexpectedChannel {
                    expected: channel.to_string(),
                    got: message.channel,
                });
            }
            Ok(Inbound::Tick(message.message))
        }
        None => Ok(Inbound::Response { id: envelope.id }),
        Some(method) => Ok(Inbound::Other {
            method: Some(method.to_string()),
        }),
    }
}
