//! Irrigation pump driver (relay / MOSFET on one GPIO).
//!
//! On/off only: the duty cycle is produced by the actuator task toggling
//! the pin, not by PWM.
//!
//! ## Dual-target design
//!
//! [`PumpDriver`] is generic over an [`OutputLine`] that hands out an
//! `embedded_hal` [`OutputPin`] once configured.  [`GpioLine`] is the
//! board implementation (raw `hw_init` helpers on ESP-IDF, no-op writes on
//! host); tests substitute their own line.

use embedded_hal::digital::{self, Error as _, ErrorKind, ErrorType, OutputPin};
use log::warn;

use crate::app::ports::{ActuatorError, ActuatorPort};
use crate::drivers::hw_init;

// ───────────────────────────────────────────────────────────────
// Output line abstraction
// ───────────────────────────────────────────────────────────────

/// A not-yet-configured GPIO line.
pub trait OutputLine {
    type Pin: OutputPin;

    fn gpio(&self) -> i32;

    /// Whether the port behind this line is usable.
    fn is_ready(&self) -> bool;

    /// Configure the line as an output.  Errors carry a platform code.
    fn configure(&mut self) -> Result<Self::Pin, i32>;
}

/// `gpio_set_level` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Configured output pin driven through [`hw_init::gpio_write`].
#[derive(Debug)]
pub struct RawOutputPin {
    gpio: i32,
}

impl ErrorType for RawOutputPin {
    type Error = GpioError;
}

impl OutputPin for RawOutputPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioError)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioError)
    }
}

/// Board GPIO line.
#[derive(Debug, Clone, Copy)]
pub struct GpioLine {
    gpio: i32,
}

impl GpioLine {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl OutputLine for GpioLine {
    type Pin = RawOutputPin;

    fn gpio(&self) -> i32 {
        self.gpio
    }

    fn is_ready(&self) -> bool {
        hw_init::is_valid_output_gpio(self.gpio)
    }

    fn configure(&mut self) -> Result<RawOutputPin, i32> {
        hw_init::configure_output(self.gpio).map_err(|e| e.code())?;
        Ok(RawOutputPin { gpio: self.gpio })
    }
}

// ───────────────────────────────────────────────────────────────
// Pump driver
// ───────────────────────────────────────────────────────────────

pub struct PumpDriver<L: OutputLine> {
    line: L,
    pin: Option<L::Pin>,
    index: u8,
    level: bool,
}

impl<L: OutputLine> PumpDriver<L> {
    pub fn new(line: L, index: u8) -> Self {
        Self {
            line,
            pin: None,
            index,
            level: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.pin.is_some()
    }

    /// Last level successfully written.
    pub fn is_running(&self) -> bool {
        self.level
    }

    pub fn pin(&self) -> Option<&L::Pin> {
        self.pin.as_ref()
    }
}

impl<L: OutputLine> ActuatorPort for PumpDriver<L> {
    fn gpio(&self) -> i32 {
        self.line.gpio()
    }

    fn index(&self) -> u8 {
        self.index
    }

    fn is_ready(&self) -> bool {
        self.line.is_ready()
    }

    fn configure_output(&mut self) -> Result<(), ActuatorError> {
        let pin = self.line.configure().map_err(|code| ActuatorError::ConfigureFailed {
            code,
            gpio: self.line.gpio(),
            index: self.index,
        })?;
        self.pin = Some(pin);
        self.level = false;
        Ok(())
    }

    fn set_level(&mut self, high: bool) {
        let Some(pin) = self.pin.as_mut() else {
            warn!("PUMP: GPIO{} written before configuration", self.line.gpio());
            return;
        };
        let written = if high { pin.set_high() } else { pin.set_low() };
        match written {
            Ok(()) => self.level = high,
            Err(e) => warn!("PUMP: GPIO{} write failed: {:?}", self.line.gpio(), e.kind()),
        }
    }
}
