//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `lightshow.toml` in the working directory, or at the path given
//! by `LIGHTSHOW_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use lightshow_adapter_gpio_sysfs::SysfsConfig;
use lightshow_adapter_mqtt::MqttConfig;
use lightshow_adapter_pushover::PushoverConfig;
use lightshow_app::controller::{self, ControllerSettings};
use lightshow_app::poller::DEFAULT_POLL_INTERVAL;
use lightshow_domain::error::LightshowError;
use lightshow_domain::id::{PinId, ZoneId};
use lightshow_domain::zone::Zone;

const DEFAULT_PATH: &str = "lightshow.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Output driver and control lines.
    pub gpio: GpioConfig,
    /// Controller timings.
    pub controller: ControllerConfig,
    /// Device shadow connection. Without it the controller runs offline.
    pub mqtt: Option<MqttConfig>,
    /// Push notifications.
    pub pushover: PushoverConfig,
    /// Lighting zones, in switching order.
    pub zones: Vec<ZoneConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Which [`OutputDriver`](lightshow_app::ports::OutputDriver) to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// In-memory relays, for development without hardware.
    #[default]
    Virtual,
    /// Linux sysfs GPIO.
    Sysfs,
}

impl DriverKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "virtual" => Some(Self::Virtual),
            "sysfs" => Some(Self::Sysfs),
            _ => None,
        }
    }
}

/// GPIO configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub driver: DriverKind,
    /// Settings of the sysfs driver.
    pub sysfs: SysfsConfig,
    /// Output held high while the controller runs.
    pub ready_pin: u8,
    /// Manual override switch input.
    pub switch_pin: u8,
}

/// Controller timings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Pause after each pin of a zone is switched on, in milliseconds.
    pub on_delay_ms: u64,
    /// Manual switch poll period, in milliseconds.
    pub poll_interval_ms: u64,
}

/// One lighting zone. The id is also the shadow's thing name.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub pins: Vec<u8>,
}

impl Config {
    /// Load configuration from `LIGHTSHOW_CONFIG` or `lightshow.toml` (if
    /// present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("LIGHTSHOW_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("LIGHTSHOW_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(driver) = var("LIGHTSHOW_GPIO_DRIVER").as_deref().and_then(DriverKind::parse) {
            self.gpio.driver = driver;
        }
        if let Some(val) = var("LIGHTSHOW_MQTT_HOST") {
            self.mqtt.get_or_insert_with(MqttConfig::default).host = val;
        }
        if let Some(val) = var("PUSHOVER_USER_KEY") {
            self.pushover.user_key = Some(val);
        }
        if let Some(val) = var("PUSHOVER_API_TOKEN") {
            self.pushover.api_token = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.mqtt.as_ref().is_some_and(|mqtt| mqtt.host.is_empty()) {
            return Err(ConfigError::Validation(
                "mqtt host must not be empty".to_string(),
            ));
        }
        let zones = self.zones()?;
        controller::validate_layout(&zones, &self.controller_settings())?;
        Ok(())
    }

    /// Build the domain zones, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Layout`] if a zone is invalid.
    pub fn zones(&self) -> Result<Vec<Zone>, ConfigError> {
        self.zones
            .iter()
            .map(|zone| {
                let mut builder = Zone::builder()
                    .id(zone.id.as_str())
                    .pins(zone.pins.iter().copied());
                if let Some(name) = &zone.friendly_name {
                    builder = builder.friendly_name(name.as_str());
                }
                if let Some(description) = &zone.description {
                    builder = builder.description(description.as_str());
                }
                builder.build().map_err(ConfigError::Layout)
            })
            .collect()
    }

    #[must_use]
    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones
            .iter()
            .map(|zone| ZoneId::new(zone.id.as_str()))
            .collect()
    }

    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            ready_pin: Some(PinId::new(self.gpio.ready_pin)),
            switch_pin: Some(PinId::new(self.gpio.switch_pin)),
            on_delay: Duration::from_millis(self.controller.on_delay_ms),
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.controller.poll_interval_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lightshowd=info,lightshow=info,rumqttc=warn".to_string(),
        }
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::default(),
            sysfs: SysfsConfig::default(),
            ready_pin: controller::DEFAULT_READY_PIN,
            switch_pin: controller::DEFAULT_SWITCH_PIN,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            on_delay_ms: u64::try_from(controller::DEFAULT_ON_DELAY.as_millis()).unwrap_or(1000),
            poll_interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(1000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            gpio: GpioConfig::default(),
            controller: ControllerConfig::default(),
            mqtt: None,
            pushover: PushoverConfig::default(),
            zones: default_zones(),
        }
    }
}

fn default_zones() -> Vec<ZoneConfig> {
    vec![
        ZoneConfig {
            id: "garden-lights".to_string(),
            friendly_name: Some("Garden Fairy Lights".to_string()),
            description: Some("Fairy lights along the garden fence".to_string()),
            pins: vec![14, 15, 25],
        },
        ZoneConfig {
            id: "summerhouse-lights".to_string(),
            friendly_name: Some("Summerhouse Lights".to_string()),
            description: None,
            pins: vec![24],
        },
    ]
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Zones or control lines do not describe a usable wiring.
    #[error("invalid zone layout")]
    Layout(#[from] LightshowError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
