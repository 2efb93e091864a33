use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    device: Device,
    #[serde(default)]
    session: SessionSettings,
}

impl AdapterConfig {
    /// Loads `config`, an optional `config_local` override and `PHAROS__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("config").required(true))
                .add_source(File::with_name("config_local").required(false))
                .add_source(Environment::with_prefix("PHAROS").prefix_separator("__").separator("__").try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AdapterConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// A blank host is valid and means "do not connect"; anything else must be an IP address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = self.device.host() {
            if host.parse::<IpAddr>().is_err() {
                return Err(ConfigError::InvalidHost(host.to_string()));
            }
        }
        if self.session.retry_ms == 0 || self.session.retry_max_delay_ms < self.session.retry_ms {
            return Err(ConfigError::InvalidRetry {
                retry_ms: self.session.retry_ms,
                retry_max_delay_ms: self.session.retry_max_delay_ms,
            });
        }
        Ok(())
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct Device {
    #[serde(default)]
    host: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    password: String,
}

impl Device {
    pub fn host(&self) -> Option<&str> {
        let host = self.host.trim();
        if host.is_empty() { None } else { Some(host) }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Debug for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default, with = "humantime_serde")]
    refresh_interval: Option<Duration>,
    #[serde(default = "default_retry_ms")]
    retry_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    retry_max_delay_ms: u64,
    #[serde(default = "default_reconnect")]
    reconnect: bool,
}

fn default_retry_ms() -> u64 {
    1_000
}

fn default_retry_max_delay_ms() -> u64 {
    60_000
}

fn default_reconnect() -> bool {
    true
}

impl SessionSettings {
    /// Interval of the inventory refresh while connected; `None` refreshes only on (re)connect.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    pub fn retry_ms(&self) -> u64 {
        self.retry_ms
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn reconnect(&self) -> bool {
        self.reconnect
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            refresh_interval: None,
            retry_ms: default_retry_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            reconnect: default_reconnect(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("'{0}' is not a valid IP address")]
    InvalidHost(String),
    #[error("retry_ms must be positive and at most retry_max_delay_ms, got {retry_ms} and {retry_max_delay_ms}")]
    InvalidRetry { retry_ms: u64, retry_max_delay_ms: u64 },
}

#[cfg(test)]
pub struct AdapterConfigBuilder {
    config: AdapterConfig,
}

#[cfg(test)]
impl AdapterConfigBuilder {
    pub fn new() -> Self {
        AdapterConfigBuilder {
            config: AdapterConfig {
                device: Device {
                    host: "10.0.0.20".to_string(),
                    user: "admin".to_string(),
                    password: "secret".to_string(),
                },
                session: SessionSettings {
                    refresh_interval: None,
                    retry_ms: 100,
                    retry_max_delay_ms: 200,
                    reconnect: false,
                },
            },
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.device.host = host.to_string();
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.session.refresh_interval = Some(interval);
        self
    }

    pub fn reconnect(mut self, reconnect: bool) -> Self {
        self.config.session.reconnect = reconnect;
        self
    }

    pub fn build(self) -> AdapterConfig {
        self.config
    }
}
