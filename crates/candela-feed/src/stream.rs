//! Lazy tick stream over inbound websocket messages.

use crate::client::FeedError;
use crate::rpc::{self, Inbound};
use candela_types::Tick;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};

/// A boxed stream of ticks for one subscription.
///
/// The stream yields at most one error, after which it ends.
pub type TickStream = BoxStream<'static, Result<Tick, FeedError>>;

struct State<S> {
    messages: S,
    channel: String,
    finished: bool,
}

/// Turns inbound websocket messages into a stream of ticks for `channel`.
///
/// Messages that cannot be decoded as a ticker for `channel` are logged and
/// skipped. Control frames, subscription acknowledgements and other
/// notifications are ignored. A close frame, a read error, or the end of the
/// underlying stream yields a single [`FeedError`] and ends the stream.
pub fn tick_stream<S>(messages: S, channel: String) -> impl Stream<Item = Result<Tick, FeedError>>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let state = State {
        messages,
        channel,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            let text = match state.messages.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        tracing::warn!(channel = %state.channel, "skipping non-utf8 binary frame");
                        continue;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    state.finished = true;
                    let reason = frame
                        .map(|f| f.reason.into_owned())
                        .filter(|r| !r.is_empty());
                    return Some((Err(FeedError::Closed { reason }), state));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(FeedError::Transport(Box::new(e))), state));
                }
                None => {
                    state.finished = true;
                    return Some((Err(FeedError::Closed { reason: None }), state));
                }
            };

            match rpc::decode(&text, &state.channel) {
                Ok(Inbound::Tick(tick)) => {
                    tracing::trace!(
                        channel = %state.channel,
                        tick_id = tick.tick_id,
                        ltp = tick.ltp,
                        "tick received"
                    );
                    return Some((Ok(tick), state));
                }
                Ok(Inbound::Response { id }) => {
                    tracing::debug!(channel = %state.channel, ?id, "request acknowledged");
                }
                Ok(Inbound::Error { detail }) => {
                    tracing::warn!(channel = %state.channel, %detail, "endpoint returned an error");
                }
                Ok(Inbound::Other { method }) => {
                    tracing::debug!(channel = %state.channel, ?method, "ignoring notification");
                }
                Err(e) => {
                    tracing::warn!(channel = %state.channel, error = %e, "skipping undecodable message");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    const CHANNEL: &str = "lightning_ticker_BTC_JPY";

    fn ticker(ltp: f64) -> Message {
        Message::Text(format!(
            r#"{{"jsonrpc":"2.0","method":"channelMessage","params":{{"channel":"{CHANNEL}","message":{{"product_code":"BTC_JPY","timestamp":"2024-01-01T10:00:05Z","ltp":{ltp}}}}}}}"#
        ))
    }

    async fn collect(messages: Vec<Result<Message, tungstenite::Error>>) -> Vec<Result<Tick, FeedError>> {
        let stream = tick_stream(stream::iter(messages), CHANNEL.to_string());
        stream.collect().await
    }

    #[tokio::test]
    async fn test_ticks_then_close() {
        let items = collect(vec![
            Ok(Message::Text(r#"{"jsonrpc":"2.0","id":1,"result":true}"#.to_string())),
            Ok(ticker(100.0)),
            Ok(Message::Ping(vec![1])),
            Ok(ticker(110.0)),
            Ok(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "bye".into(),
            }))),
            Ok(ticker(120.0)),
        ])
        .await;

        assert_eq!(items.len(), 3);
        assert!((items[0].as_ref().unwrap().ltp - 100.0).abs() < 1e-10);
        assert!((items[1].as_ref().unwrap().ltp - 110.0).abs() < 1e-10);
        assert!(matches!(
            &items[2],
            Err(FeedError::Closed { reason: Some(r) }) if r == "bye"
        ));
    }

    #[tokio::test]
    async fn test_malformed_messages_are_skipped() {
        let items = collect(vec![
            Ok(Message::Text("garbage".to_string())),
            Ok(Message::Text(
                r#"{"jsonrpc":"2.0","method":"channelMessage","params":{"channel":"lightning_ticker_ETH_JPY","message":{}}}"#
                    .to_string(),
            )),
            Ok(ticker(100.0)),
        ])
        .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(FeedError::Closed { reason: None })));
    }

    #[tokio::test]
    async fn test_read_error_ends_stream() {
        let items = collect(vec![
            Ok(ticker(100.0)),
            Err(tungstenite::Error::ConnectionClosed),
            Ok(ticker(110.0)),
        ])
        .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(FeedError::Transport(_))));
    }
}
