//! Controller configuration parameters
//!
//! Every board-specific value lives here: default setpoints, actuator pin
//! identifiers, ADC scaling, and pipeline timing.  One parameterized
//! control engine reads these rather than carrying per-board copies.
//!
//! Overrides are supplied as JSON at build time (`ROOMCTL_CONFIG_JSON`);
//! fields missing from the JSON keep their defaults.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Setpoints applied to newly registered rooms ---
    /// Upper comfort bound (°C); above it the AC is switched on.
    pub upper_heat_threshold_c: u8,
    /// Lower comfort bound (°C); below it the heater is switched on.
    pub lower_heat_threshold_c: u8,
    /// Light level (percent) below which lights are switched on.
    pub light_threshold_percent: u8,
    /// Minimum gap kept between the lower and upper heat thresholds (°C).
    pub heat_band_margin_c: u8,

    // --- Radio wiring ---
    /// Remote digital-output pin identifiers for each actuator.
    pub actuator_pins: ActuatorPins,
    /// ADC code conversions for the remote sensor inputs.
    pub scaling: Scaling,
    /// Coordinator UART baud rate.
    pub uart_baud: u32,
    /// Remote periodic sampling interval programmed at start-up (ms).
    pub sample_interval_ms: u16,
    /// Delay between provisioning frames while the network settles (ms).
    pub provisioning_settle_ms: u32,

    // --- Keypad / arming ---
    /// Keypad poll period (ms).
    pub poll_period_ms: u32,
    /// Delay between arming and the system going fully active (s).
    pub arm_countdown_secs: u16,
    /// Passcode entry is abandoned after this long without a press (ms).
    pub passcode_timeout_ms: u32,
    /// Button identity codes (1–7) that make up the passcode, oldest first.
    pub passcode: [u8; 4],

    // --- Pipeline ---
    /// Upper bound on a blocked mailbox send; `None` waits forever.
    pub mailbox_send_timeout_ms: Option<u32>,
    /// Transmit-lock wait after which a diagnostic is logged (ms).
    pub tx_lock_warn_ms: u32,
}

/// Digital-output pin identifiers (the second character of the `Dn` AT
/// command) for the three actuators on every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorPins {
    pub light: u8,
    pub heater: u8,
    pub ac: u8,
}

impl Default for ActuatorPins {
    fn default() -> Self {
        Self {
            light: b'2',  // D2
            heater: b'5', // D5
            ac: b'6',     // D6
        }
    }
}

/// Conversions from 10-bit remote ADC codes to engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scaling {
    /// Full-scale ADC code.
    pub adc_max: u16,
    /// LDR code read in darkness (maps to 1 %).
    pub light_adc_min: u16,
    /// LDR code read in full light (maps to 100 %).
    pub light_adc_max: u16,
    /// ADC reference in millivolts.
    pub adc_ref_mv: u16,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            adc_max: 1023,
            light_adc_min: 168,
            light_adc_max: 880,
            adc_ref_mv: 1200,
        }
    }
}

impl Scaling {
    /// Light level in percent (1–100).
    pub fn light_percent(&self, code: u16) -> u8 {
        let span = u32::from(self.light_adc_max.saturating_sub(self.light_adc_min)).max(1);
        let above = u32::from(code.clamp(self.light_adc_min, self.light_adc_max) - self.light_adc_min);
        (above * 99 / span + 1) as u8
    }

    /// TMP36 temperature in whole °C (10 mV/°C, 500 mV offset).
    pub fn temperature_c(&self, code: u16) -> i16 {
        let mv = i32::from(code) * i32::from(self.adc_ref_mv) / i32::from(self.adc_max.max(1));
        ((mv - 500) / 10) as i16
    }

    /// Potentiometer position in percent (0–100).
    pub fn pot_percent(&self, code: u16) -> u8 {
        let max = u32::from(self.adc_max.max(1));
        (u32::from(code).min(max) * 100 / max) as u8
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Setpoints
            upper_heat_threshold_c: 24,
            lower_heat_threshold_c: 10,
            light_threshold_percent: 40,
            heat_band_margin_c: 2,

            // Radio
            actuator_pins: ActuatorPins::default(),
            scaling: Scaling::default(),
            uart_baud: 9600,
            sample_interval_ms: 2000,
            provisioning_settle_ms: 1000,

            // Keypad
            poll_period_ms: 20,
            arm_countdown_secs: 10,
            passcode_timeout_ms: 3000,
            passcode: [1, 2, 4, 3],

            // Pipeline
            mailbox_send_timeout_ms: None,
            tx_lock_warn_ms: 500,
        }
    }
}

impl ControllerConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for this build: the JSON override if one
    /// was supplied and is valid, otherwise the defaults.
    pub fn load(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(config)) => {
                info!("Config loaded from board override");
                config
            }
            Some(Err(e)) => {
                warn!("Board config rejected ({}), using defaults", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Reject values that would break a controller invariant.
    pub fn validate(&self) -> Result<(), Error> {
        if self.heat_band_margin_c == 0 || self.heat_band_margin_c >= 100 {
            return Err(Error::Config("heat_band_margin_c must be 1..=99"));
        }
        if u16::from(self.lower_heat_threshold_c) + u16::from(self.heat_band_margin_c)
            > u16::from(self.upper_heat_threshold_c)
        {
            return Err(Error::Config("heat thresholds closer than band margin"));
        }
        if self.upper_heat_threshold_c > 100 || self.light_threshold_percent > 100 {
            return Err(Error::Config("setpoints must be within 0..=100"));
        }
        let pins = self.actuator_pins;
        if pins.light == pins.heater || pins.light == pins.ac || pins.heater == pins.ac {
            return Err(Error::Config("actuator pins must be distinct"));
        }
        if self.scaling.light_adc_min >= self.scaling.light_adc_max || self.scaling.adc_max == 0 {
            return Err(Error::Config("invalid ADC scaling"));
        }
        if self.poll_period_ms == 0 || self.arm_countdown_secs == 0 {
            return Err(Error::Config("poll period and countdown must be non-zero"));
        }
        if self.passcode.iter().any(|&code| code == 0 || code > 7) {
            return Err(Error::Config("passcode digits must be 1..=7"));
        }
        Ok(())
    }

    /// Arming countdown expressed in keypad poll ticks.
    pub fn countdown_ticks(&self) -> u16 {
        let ticks = u32::from(self.arm_countdown_secs) * 1000 / self.poll_period_ms.max(1);
        ticks.clamp(1, u32::from(u16::MAX)) as u16
    }

    /// Passcode entry timeout expressed in keypad poll ticks.
    pub fn passcode_timeout_ticks(&self) -> u16 {
        let ticks = self.passcode_timeout_ms / self.poll_period_ms.max(1);
        ticks.clamp(1, u32::from(u16::MAX)) as u16
    }
}
