//! # lightshow-adapter-gpio-sysfs
//!
//! Output driver backed by the Linux sysfs GPIO interface.
//!
//! ## How it works
//!
//! ```text
//! /sys/class/gpio/export          <- "14"       claim pin 14
//! /sys/class/gpio/gpio14/direction <- "out"
//! /sys/class/gpio/gpio14/value     <- "1" | "0"
//! /sys/class/gpio/unexport        <- "14"       on release
//! ```
//!
//! Pins that were already exported before [`acquire`](OutputDriver::acquire)
//! are used as they are and left exported on release.
//!
//! Sysfs cannot enable pull-up resistors: the switch input relies on the
//! pull-up configured by the device tree (GPIO 17 pulls up by default on a
//! Raspberry Pi).
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lightshow-app` and `lightshow-domain`.

mod config;
mod error;

pub use config::SysfsConfig;
pub use error::GpioError;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lightshow_app::ports::OutputDriver;
use lightshow_domain::error::LightshowError;
use lightshow_domain::id::PinId;

/// Poll step while waiting for an exported pin directory.
const EXPORT_POLL_STEP: Duration = Duration::from_millis(10);

/// [`OutputDriver`] writing to `/sys/class/gpio`.
pub struct SysfsOutputDriver {
    config: SysfsConfig,
    acquired: bool,
    exported: Vec<PinId>,
}

impl SysfsOutputDriver {
    #[must_use]
    pub fn new(config: SysfsConfig) -> Self {
        Self {
            config,
            acquired: false,
            exported: Vec::new(),
        }
    }

    fn pin_dir(&self, pin: PinId) -> PathBuf {
        self.config.root.join(format!("gpio{pin}"))
    }

    fn ensure_acquired(&self) -> Result<(), GpioError> {
        if self.acquired {
            Ok(())
        } else {
            Err(GpioError::NotAcquired)
        }
    }

    fn export(&mut self, pin: PinId) -> Result<(), GpioError> {
        let dir = self.pin_dir(pin);
        if dir.exists() {
            return Ok(());
        }

        write_attr(&self.config.root.join("export"), &pin.to_string())?;
        self.exported.push(pin);

        let deadline = Instant::now() + Duration::from_millis(self.config.export_timeout_ms);
        while !dir.join("direction").exists() {
            if Instant::now() >= deadline {
                return Err(GpioError::ExportTimeout(pin));
            }
            std::thread::sleep(EXPORT_POLL_STEP);
        }
        tracing::debug!(%pin, "pin exported");
        Ok(())
    }

    fn configure(&mut self, pin: PinId, direction: &str) -> Result<(), GpioError> {
        self.ensure_acquired()?;
        self.export(pin)?;
        let dir = self.pin_dir(pin);
        write_attr(&dir.join("direction"), direction)?;
        if direction == "out" {
            let active_low = if self.config.active_low { "1" } else { "0" };
            write_attr(&dir.join("active_low"), active_low)?;
        }
        Ok(())
    }
}

impl OutputDriver for SysfsOutputDriver {
    fn acquire(&mut self) -> Result<(), LightshowError> {
        if !self.config.root.join("export").exists() {
            return Err(GpioError::Unavailable(self.config.root.clone()).into());
        }
        self.acquired = true;
        tracing::info!(root = %self.config.root.display(), "sysfs GPIO acquired");
        Ok(())
    }

    fn configure_output(&mut self, pin: PinId) -> Result<(), LightshowError> {
        Ok(self.configure(pin, "out")?)
    }

    fn configure_input(&mut self, pin: PinId) -> Result<(), LightshowError> {
        self.configure(pin, "in")?;
        tracing::debug!(%pin, "input configured, pull-up left to the device tree");
        Ok(())
    }

    fn set_output(&mut self, pin: PinId, active: bool) -> Result<(), LightshowError> {
        self.ensure_acquired()?;
        let value = if active { "1" } else { "0" };
        Ok(write_attr(&self.pin_dir(pin).join("value"), value)?)
    }

    fn read_input(&self, pin: PinId) -> Result<bool, LightshowError> {
        self.ensure_acquired()?;
        let path = self.pin_dir(pin).join("value");
        let raw = std::fs::read_to_string(&path).map_err(|source| GpioError::Io {
            path: path.clone(),
            source,
        })?;
        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(GpioError::UnexpectedValue {
                pin,
                value: other.to_string(),
            }
            .into()),
        }
    }

    fn release(&mut self) -> Result<(), LightshowError> {
        let unexport = self.config.root.join("unexport");
        let mut first_error = None;
        for pin in self.exported.drain(..) {
            if let Err(err) = write_attr(&unexport, &pin.to_string()) {
                tracing::warn!(%pin, error = ?err, "unable to unexport pin");
                first_error.get_or_insert(err);
            }
        }
        self.acquired = false;
        tracing::info!("sysfs GPIO released");
        first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), GpioError> {
    std::fs::write(path, value).map_err(|source| GpioError::Io {
        path: path.to_path_buf(),
        source,
    })
}
