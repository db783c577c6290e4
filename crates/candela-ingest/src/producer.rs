//! Feed task: subscribes, reconnects, and pushes ticks into the queue.

use std::sync::Arc;

use candela_feed::{FeedError, ReconnectPolicy, TickSource};
use candela_types::Tick;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::IngestError;

/// Runs the feed until cancelled, the consumer goes away, or reconnects run out.
///
/// A closed queue is noticed even while the feed is silent.
///
/// Returns the number of sessions re-established after a failure. Sends
/// wait for queue capacity; ticks are never dropped on a full queue.
pub(crate) async fn produce<S>(
    source: Arc<S>,
    product_code: String,
    policy: ReconnectPolicy,
    tx: mpsc::Sender<Tick>,
    cancel: CancellationToken,
) -> Result<u64, IngestError>
where
    S: TickSource + ?Sized,
{
    let mut failures = 0u32;
    let mut reconnects = 0u64;

    loop {
        let subscribed = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(reconnects),
            () = tx.closed() => return Ok(queue_closed(&product_code, reconnects)),
            result = source.subscribe(&product_code) => result,
        };
        if failures > 0 && subscribed.is_ok() {
            reconnects += 1;
        }

        let error = match subscribed {
            Ok(mut stream) => loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::info!(product_code = %product_code, "feed cancelled");
                        return Ok(reconnects);
                    }
                    () = tx.closed() => return Ok(queue_closed(&product_code, reconnects)),
                    next = stream.next() => next,
                };
                match next {
                    Some(Ok(tick)) => {
                        failures = 0;
                        if tx.send(tick).await.is_err() {
                            return Ok(queue_closed(&product_code, reconnects));
                        }
                    }
                    Some(Err(e)) => break e,
                    None => break FeedError::Closed { reason: None },
                }
            },
            Err(e) => e,
        };

        failures += 1;
        if !policy.allows(failures) {
            tracing::error!(
                product_code = %product_code,
                attempts = failures,
                error = %error,
                "feed retries exhausted"
            );
            return Err(IngestError::FeedExhausted {
                attempts: failures,
                source: error,
            });
        }

        let delay = policy.delay(failures);
        tracing::warn!(
            product_code = %product_code,
            attempt = failures,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "feed interrupted, reconnecting"
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(reconnects),
            () = tx.closed() => return Ok(queue_closed(&product_code, reconnects)),
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// The consumer is gone, so nothing would apply further ticks.
fn queue_closed(product_code: &str, reconnects: u64) -> u64 {
    tracing::warn!(product_code = %product_code, "tick queue closed, stopping feed");
    reconnects
}
