//! Device shadow connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration for the shadow MQTT connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname (the AWS IoT data endpoint).
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
    /// Upper bound for a single publish, in seconds.
    pub operation_timeout_secs: u64,
    /// Root CA certificate (PEM). TLS is enabled when set.
    pub ca_path: Option<PathBuf>,
    /// Client certificate (PEM).
    pub cert_path: Option<PathBuf>,
    /// Client private key (PEM).
    pub key_path: Option<PathBuf>,
    /// ALPN protocol, e.g. `x-amzn-mqtt-ca` to reach AWS IoT on port 443.
    pub alpn: Option<String>,
    /// Reconnect policy.
    pub reconnect: ReconnectConfig,
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8883,
            client_id: "lightshow".to_string(),
            keep_alive_secs: 60,
            operation_timeout_secs: 5,
            ca_path: None,
            cert_path: None,
            key_path: None,
            alpn: None,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Exponential backoff between reconnection attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// First delay, in seconds.
    pub initial_backoff_secs: u64,
    /// Delay cap, in seconds.
    pub max_backoff_secs: u64,
    /// Retries allowed after consecutive failures before the connection is
    /// abandoned.
    pub max_retries: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 1,
            max_backoff_secs: 32,
            max_retries: 20,
        }
    }
}
