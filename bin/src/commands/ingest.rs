//! Ingest command implementation.
//!
//! Runs the live pipeline until Ctrl-C or a fatal feed error.

use crate::settings::Settings;
use anyhow::{Context, Result};
use candela_lib::prelude::*;
use std::sync::Arc;

/// Subscribes to the feed and aggregates ticks into the candle store.
pub(crate) async fn ingest(settings: &Settings) -> Result<()> {
    // Reject a bad registry before any connection is opened.
    let config = settings.ingest_config()?;
    let store = initialize_store(&settings.store_config()).context("Failed to open candle store")?;
    let client = Arc::new(FeedClient::new(settings.feed_config()));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl-c received, shutting down");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    let summary = Coordinator::new(config, store)
        .run(client, cancel)
        .await
        .context("Ingestion aborted")?;

    println!("{summary}");
    Ok(())
}
