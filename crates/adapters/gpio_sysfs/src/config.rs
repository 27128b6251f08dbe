//! Sysfs GPIO configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the sysfs output driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SysfsConfig {
    /// GPIO class directory.
    pub root: PathBuf,
    /// Invert every output (for relay boards that switch on a low level).
    pub active_low: bool,
    /// How long to wait for udev to create a pin directory after export, in
    /// milliseconds.
    pub export_timeout_ms: u64,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class/gpio"),
            active_low: false,
            export_timeout_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = SysfsConfig::default();
        assert_eq!(config.root, PathBuf::from("/sys/class/gpio"));
        assert!(!config.active_low);
        assert_eq!(config.export_timeout_ms, 500);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            root = "/tmp/gpio"
            active_low = true
            export_timeout_ms = 50
        "#;
        let config: SysfsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.root, PathBuf::from("/tmp/gpio"));
        assert!(config.active_low);
        assert_eq!(config.export_timeout_ms, 50);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: SysfsConfig = toml::from_str("active_low = true").unwrap();
        assert_eq!(config.root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(config.export_timeout_ms, 500);
    }
}
