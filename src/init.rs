use crate::env::{self, LabelParseError, LOG_LABELS_ENV, LOG_REPORT_CALLER_ENV};
use crate::formatter::Formatter;
use crate::layer::StructuredLogLayer;
use std::collections::BTreeMap;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `labels`: static labels attached to every record.
/// - `report_caller`: if `true`, every event carries its call site and
///   error events get an `exception` entry in the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerConfig {
    pub labels: BTreeMap<String, String>,
    pub report_caller: bool,
}

impl LayerConfig {
    /// Build a config from `LOG_LABELS` and `LOG_REPORT_CALLER`.
    ///
    /// **Returns**
    /// - `Err(..)` if `LOG_LABELS` is set but not a valid
    ///   `key=value,key=value` list.
    pub fn from_env() -> Result<Self, LabelParseError> {
        Ok(LayerConfig {
            labels: env::parse_labels(&env::env_or(LOG_LABELS_ENV, ""))?,
            report_caller: env::parse_flag(&env::env_or(LOG_REPORT_CALLER_ENV, "false")),
        })
    }

    /// Build the [`Formatter`] described by this config.
    pub fn formatter(&self) -> Formatter {
        Formatter::new().with_labels(self.labels.clone())
    }

    /// Build a stdout [`StructuredLogLayer`] described by this config.
    pub fn layer(&self) -> StructuredLogLayer {
        StructuredLogLayer::new(self.formatter()).with_caller(self.report_caller)
    }
}

/// Error returned by the `init_*` functions.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid logging configuration: {0}")]
    Config(#[from] LabelParseError),
    #[error("failed to install global subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Install a [`Registry`] with a stdout [`StructuredLogLayer`] built from
/// `config` as the global default subscriber.
///
/// Calling this (or any other global subscriber setup) twice fails with
/// [`InitError::SetGlobalDefault`].
pub fn init_tracing_with_config(config: LayerConfig) -> Result<(), InitError> {
    let subscriber = Registry::default().with(config.layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize tracing from the environment.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::from_env`].
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_config(LayerConfig::from_env()?)
}
