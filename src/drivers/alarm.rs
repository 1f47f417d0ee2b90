//! Intrusion sounder output.
//!
//! Mirrors the shared alarm flag onto an active-HIGH GPIO, writing the pin
//! only when the level changes.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct AlarmOutput<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> AlarmOutput<P> {
    /// Take the pin and drive it low.
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            warn!("alarm: initial set_low failed");
        }
        Self { pin, on: false }
    }

    pub fn apply(&mut self, raised: bool) {
        if raised == self.on {
            return;
        }
        let result = if raised {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.on = raised,
            Err(_) => warn!("alarm: pin write failed"),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
