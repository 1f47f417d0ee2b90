//! Passcode shift register with entry timeout.

use log::debug;

/// Bits per button identity code.
pub const CODE_BITS: u32 = 3;
/// Codes retained in the register.
pub const PASSCODE_LEN: usize = 4;
const REGISTER_MASK: u16 = (1 << (CODE_BITS as usize * PASSCODE_LEN)) - 1;

/// Pack identity codes (oldest first) into the register layout.
pub fn pack(codes: [u8; PASSCODE_LEN]) -> u16 {
    codes.iter().fold(0u16, |acc, &code| {
        ((acc << CODE_BITS) | u16::from(code & 0b111)) & REGISTER_MASK
    })
}

pub struct PasscodeEntry {
    register: u16,
    passcode: u16,
    idle_ticks: u16,
    timeout_ticks: u16,
}

impl PasscodeEntry {
    pub fn new(passcode: [u8; PASSCODE_LEN], timeout_ticks: u16) -> Self {
        Self {
            register: 0,
            passcode: pack(passcode),
            idle_ticks: 0,
            timeout_ticks: timeout_ticks.max(1),
        }
    }

    /// Shift in a settled press.  Returns `true` when the register now
    /// holds the passcode; the register is then cleared.
    pub fn push(&mut self, code: u8) -> bool {
        self.register = ((self.register << CODE_BITS) | u16::from(code & 0b111)) & REGISTER_MASK;
        self.idle_ticks = 0;
        if self.register == self.passcode {
            self.register = 0;
            return true;
        }
        false
    }

    /// Advance the entry timeout by one poll tick.
    pub fn tick(&mut self) {
        if self.register == 0 {
            return;
        }
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks >= self.timeout_ticks {
            debug!("passcode entry timed out");
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.register = 0;
        self.idle_ticks = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.register == 0
    }
}
