//! Raw GPIO helpers.
//!
//! Configures and drives digital outputs using raw ESP-IDF sys calls.
//! Pins are configured once, from the task that owns them, before use.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors while bringing up a GPIO output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// The pin number cannot be used as an output on this chip.
    InvalidGpio(i32),
    /// `gpio_config` returned an error code.
    GpioConfigFailed(i32),
}

impl HwInitError {
    /// Raw platform code (negative errno style for an invalid pin).
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidGpio(_) => -22, // EINVAL
            Self::GpioConfigFailed(rc) => *rc,
        }
    }
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidGpio(pin)     => write!(f, "GPIO{} is not a valid output", pin),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

// ── GPIO Outputs ──────────────────────────────────────────────

/// Whether `pin` exists on this chip and can drive an output.
#[cfg(target_os = "espidf")]
pub fn is_valid_output_gpio(pin: i32) -> bool {
    (0..gpio_num_t_GPIO_NUM_MAX as i32).contains(&pin)
}

/// Whether `pin` exists on this chip and can drive an output.
#[cfg(not(target_os = "espidf"))]
pub fn is_valid_output_gpio(pin: i32) -> bool {
    (0..=48).contains(&pin)
}

/// Configure `pin` as a push-pull output, initially low.
#[cfg(target_os = "espidf")]
pub fn configure_output(pin: i32) -> Result<(), HwInitError> {
    if !is_valid_output_gpio(pin) {
        return Err(HwInitError::InvalidGpio(pin));
    }
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: `cfg` is fully initialised; the pin was range-checked above.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    // SAFETY: pin configured as output just above.
    unsafe { gpio_set_level(pin, 0) };

    info!("hw_init: GPIO{} configured as output", pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_output(pin: i32) -> Result<(), HwInitError> {
    if !is_valid_output_gpio(pin) {
        return Err(HwInitError::InvalidGpio(pin));
    }
    log::info!("hw_init(sim): GPIO{} configured as output", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 { return Err(ret); }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> Result<(), i32> {
    Ok(())
}
