//! Durations command implementation.

use crate::settings::Settings;
use anyhow::{Context, Result};

/// Lists the configured bucket durations.
pub(crate) fn list_durations(settings: &Settings) -> Result<()> {
    let registry = settings
        .registry()
        .context("Invalid duration configuration")?;

    println!("{:<10} {:<15} {:<8}", "LABEL", "MILLIS", "DECISION");
    println!("{}", "-".repeat(35));

    for (label, duration) in registry.iter() {
        let marker = if registry.is_decision(duration) { "*" } else { "" };
        println!("{:<10} {:<15} {:<8}", label, duration.as_millis(), marker);
    }

    println!("\nProduct: {}", settings.product_code);
    Ok(())
}
