//! Candles command implementation.

use crate::settings::Settings;
use anyhow::{Context, Result};
use candela_lib::prelude::*;

/// Prints the most recent candles of one timeline as JSON.
pub(crate) fn candles(
    settings: &Settings,
    product_code: Option<&str>,
    duration: &str,
    limit: Option<&str>,
) -> Result<()> {
    let duration: BucketDuration = duration
        .parse()
        .with_context(|| format!("Invalid duration '{duration}'"))?;
    let product_code = product_code.unwrap_or(&settings.product_code);
    let limit = QueryLimit::parse(limit);

    let store = initialize_store(&settings.store_config()).context("Failed to open candle store")?;
    let series = store.query_range(product_code, duration, limit)?;

    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}
