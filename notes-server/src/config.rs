//! Service configuration

use std::net::SocketAddr;

use derivative::Derivative;
use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Notes API access
#[derive(Debug, Clone, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Api {
    /// Base URL of the Notes API, endpoint paths are appended to it
    #[serde(default = "Api::default_base_url")]
    #[derivative(Default(value = "Api::default_base_url()"))]
    pub base_url: String,
}

impl Api {
    fn default_base_url() -> String {
        "http://localhost:8000".to_owned()
    }
}

/// Session cookies attributes
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct Cookies {
    /// Marks session cookies `Secure`, should be enabled in production
    #[serde(default)]
    pub secure: bool,
}

/// Top level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address where to host the service
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,

    #[serde(default)]
    pub api: Api,

    #[serde(default)]
    pub cookies: Cookies,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3000).into()
    }
}
