//! Layered runtime settings.
//!
//! Precedence, highest first: command-line flags, `CANDELA_*` environment
//! variables, the config file, built-in defaults.

use anyhow::{Context, Result};
use candela_lib::prelude::*;
use candela_lib::{DEFAULT_ENDPOINT, DEFAULT_TOPIC_PREFIX, RegistryError};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_NAME: &str = "candela";

/// Values given on the command line.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) product_code: Option<String>,
    pub(crate) durations: Option<Vec<String>>,
    pub(crate) decision_duration: Option<String>,
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) endpoint: Option<String>,
    pub(crate) log_file: Option<PathBuf>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Settings {
    pub(crate) product_code: String,
    pub(crate) durations: Vec<String>,
    pub(crate) decision_duration: String,
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) endpoint: String,
    pub(crate) topic_prefix: String,
    pub(crate) channel_capacity: usize,
    pub(crate) log_file: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from `config_file` (or `./candela.*` if present), the
    /// environment, and `overrides`.
    pub(crate) fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = Config::builder()
            .set_default("product_code", "BTC_JPY")?
            .set_default("durations", vec!["1s", "1m", "1h"])?
            .set_default("decision_duration", "1m")?
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("topic_prefix", DEFAULT_TOPIC_PREFIX)?
            .set_default("channel_capacity", IngestConfig::DEFAULT_CHANNEL_CAPACITY as i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("CANDELA")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("durations"),
            )
            .set_override_option("product_code", overrides.product_code.clone())?
            .set_override_option("durations", overrides.durations.clone())?
            .set_override_option("decision_duration", overrides.decision_duration.clone())?
            .set_override_option("db_path", path_value(overrides.db_path.as_deref()))?
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("log_file", path_value(overrides.log_file.as_deref()))?
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Builds the duration registry, rejecting an unusable configuration.
    pub(crate) fn registry(&self) -> Result<DurationRegistry, RegistryError> {
        DurationRegistry::from_labels(&self.durations, &self.decision_duration)
    }

    pub(crate) fn ingest_config(&self) -> Result<IngestConfig> {
        let registry = self
            .registry()
            .context("Invalid duration configuration")?;
        Ok(IngestConfig::new(self.product_code.clone(), registry)
            .with_channel_capacity(self.channel_capacity))
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        self.db_path
            .as_ref()
            .map_or_else(StoreConfig::default, StoreConfig::at)
    }

    pub(crate) fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            endpoint: self.endpoint.clone(),
            topic_prefix: self.topic_prefix.clone(),
            ..FeedConfig::default()
        }
    }
}

fn path_value(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(ext: &str, body: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let file = write_config(".toml", "");
        let settings = Settings::load(Some(file.path()), &Overrides::default()).unwrap();

        assert_eq!(settings.product_code, "BTC_JPY");
        assert_eq!(settings.durations, vec!["1s", "1m", "1h"]);
        assert_eq!(settings.decision_duration, "1m");
        assert_eq!(settings.endpoint, "wss://ws.lightstream.bitflyer.com/json-rpc");
        assert_eq!(settings.topic_prefix, "lightning_ticker");
        assert_eq!(settings.channel_capacity, 1024);
        assert!(settings.db_path.is_none());
        assert!(settings.log_file.is_none());

        let registry = settings.registry().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.decision(), BucketDuration::MINUTE);
    }

    #[test]
    fn test_file_then_overrides() {
        let file = write_config(
            ".toml",
            r#"
product_code = "ETH_JPY"
durations = ["5m", "1h"]
decision_duration = "5m"
db_path = "/var/lib/candela/eth.db"
"#,
        );
        let overrides = Overrides {
            product_code: Some("FX_BTC_JPY".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::load(Some(file.path()), &overrides).unwrap();

        assert_eq!(settings.product_code, "FX_BTC_JPY");
        assert_eq!(settings.durations, vec!["5m", "1h"]);
        assert_eq!(
            settings.store_config().path,
            PathBuf::from("/var/lib/candela/eth.db")
        );
        assert_eq!(
            settings.ingest_config().unwrap().registry.decision().label(),
            "5m"
        );
    }

    #[test]
    fn test_invalid_registry_is_rejected() {
        let file = write_config(".toml", "");
        let overrides = Overrides {
            durations: Some(vec!["1m".to_string()]),
            decision_duration: Some("1h".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::load(Some(file.path()), &overrides).unwrap();
        assert!(settings.ingest_config().is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/candela.toml")), &Overrides::default());
        assert!(result.is_err());
    }
}
