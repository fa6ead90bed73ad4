use learn_client::config::{Config as ClientConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "agentic".into()
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.client.validate()?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid client config: {0}")]
    Invalid(#[from] ValidationError),
}
