//! Realtime ticker feed client for the candela tick-to-candle pipeline.
//!
//! This crate provides the streaming side of the pipeline:
//!
//! - [`rpc`] - JSON-RPC 2.0 envelopes and typed decoding of channel messages
//! - [`FeedClient`] - Websocket connection and channel subscription
//! - [`tick_stream`] - Lazy tick stream over inbound websocket messages
//! - [`ReconnectPolicy`] - Exponential backoff for resubscribing after failures
//! - [`TickSource`] - Seam between the coordinator and a live or scripted feed

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
pub mod rpc;
mod stream;

pub use client::{
    DEFAULT_ENDPOINT, DEFAULT_TOPIC_PREFIX, FeedClient, FeedConfig, FeedError, ReconnectPolicy,
    TickSource,
};
pub use rpc::{DecodeError, Inbound};
pub use stream::{TickStream, tick_stream};
