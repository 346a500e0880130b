//! Linux sysfs GPIO output pin.
//!
//! Implements the embedded-hal 1.0 digital output traits on top of
//! `/sys/class/gpio`, so [`Relay`](crate::drivers::relay::Relay) can drive
//! a Raspberry Pi header pin the same way it drives a mock in tests.
//!
//! - **open** — export the line (if needed) and set direction `low`,
//!   which makes it an output that starts OFF.
//! - **drop** — drive the line low and unexport it.  Runs on every exit
//!   path, including unwinding.
//!
//! Config files name header pins by BCM offset.  Sysfs wants the global
//! line number, which is the header controller's `gpiochipN/base` plus
//! that offset (512 on current Raspberry Pi kernels, 0 on older ones).

use std::fs;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use log::{debug, info, warn};

use crate::error::{ActuatorError, Error};

/// Default sysfs GPIO class directory.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// `label` prefixes of the SoC controllers that drive the 40-pin header.
const HEADER_CHIP_LABELS: &[&str] = &["pinctrl-bcm2835", "pinctrl-bcm2711", "pinctrl-rp1"];

/// Error type for pin operations, wrapping the domain actuator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub ActuatorError);

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct SysfsOutputPin {
    root: PathBuf,
    gpio: u32,
    line_dir: PathBuf,
}

/// Global sysfs number of the first header line.
///
/// Scans `gpiochip*` entries under `root` for a header controller label.
/// When none is present the offsets are used as-is (base 0).
pub fn header_chip_base(root: impl AsRef<Path>) -> Result<u32, Error> {
    let root = root.as_ref();
    let entries = fs::read_dir(root).map_err(|_| Error::Init("GPIO sysfs root unreadable"))?;
    for entry in entries.flatten() {
        let chip_dir = entry.path();
        let is_chip = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with("gpiochip"));
        if !is_chip {
            continue;
        }
        let Ok(label) = fs::read_to_string(chip_dir.join("label")) else {
            continue;
        };
        let label = label.trim();
        if !HEADER_CHIP_LABELS.iter().any(|known| label.starts_with(known)) {
            continue;
        }
        let base = fs::read_to_string(chip_dir.join("base"))
            .map_err(|_| Error::Init("GPIO chip base unreadable"))?
            .trim()
            .parse()
            .map_err(|_| Error::Init("GPIO chip base malformed"))?;
        debug!("GPIO header controller {} at base {}", label, base);
        return Ok(base);
    }
    warn!("GPIO header controller not found, using offsets as line numbers");
    Ok(0)
}

impl SysfsOutputPin {
    /// Export header pin `offset` (BCM numbering) under the system sysfs
    /// root and configure it as an output driven low.
    pub fn export(offset: u32) -> Result<Self, Error> {
        Self::export_header_line(SYSFS_GPIO_ROOT, offset)
    }

    /// Same as [`export`](Self::export) with an explicit sysfs root.
    pub fn export_header_line(root: impl AsRef<Path>, offset: u32) -> Result<Self, Error> {
        let base = header_chip_base(&root)?;
        let gpio = base
            .checked_add(offset)
            .ok_or(Error::Init("GPIO line number overflow"))?;
        Self::with_root(root, gpio)
    }

    /// Open global sysfs line `gpio` under `root`.
    pub fn with_root(root: impl AsRef<Path>, gpio: u32) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        let line_dir = root.join(format!("gpio{gpio}"));

        if !line_dir.exists() {
            fs::write(root.join("export"), gpio.to_string())
                .map_err(|_| Error::Init("GPIO export failed"))?;
        }
        if !line_dir.exists() {
            return Err(Error::Actuator(ActuatorError::LineUnavailable));
        }
        // "low" = output direction with the value latched at 0.
        fs::write(line_dir.join("direction"), "low")
            .map_err(|_| Error::Init("GPIO direction setup failed"))?;

        info!("GPIO {} exported as output (OFF)", gpio);
        Ok(Self {
            root,
            gpio,
            line_dir,
        })
    }

    fn write_value(&self, high: bool) -> Result<(), GpioError> {
        fs::write(self.line_dir.join("value"), if high { "1" } else { "0" })
            .map_err(|_| GpioError(ActuatorError::GpioWriteFailed))
    }

    fn read_value(&self) -> Result<bool, GpioError> {
        let raw = fs::read_to_string(self.line_dir.join("value"))
            .map_err(|_| GpioError(ActuatorError::GpioReadFailed))?;
        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(GpioError(ActuatorError::GpioReadFailed)),
        }
    }
}

impl ErrorType for SysfsOutputPin {
    type Error = GpioError;
}

impl OutputPin for SysfsOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_value(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_value(true)
    }
}

impl StatefulOutputPin for SysfsOutputPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.read_value()
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.read_value().map(|high| !high)
    }
}

impl Drop for SysfsOutputPin {
    fn drop(&mut self) {
        if self.write_value(false).is_err() {
            warn!("GPIO {} could not be driven low on release", self.gpio);
        }
        if fs::write(self.root.join("unexport"), self.gpio.to_string()).is_err() {
            warn!("GPIO {} unexport failed", self.gpio);
        }
        info!("GPIO {} released", self.gpio);
    }
}
