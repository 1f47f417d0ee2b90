//! Polled, consensus-debounced keypad driver.
//!
//! ## Hardware
//!
//! Four active-low momentary switches with internal pull-ups, read from the
//! 20 ms poll timer.  No interrupts: contact bounce is filtered in software.
//!
//! ## Debounce
//!
//! Each button shifts one sample per poll into an 8-bit history (newest in
//! bit 0).  A press has settled when
//!
//! ```text
//! history & 0b1100_0111 == 0b0000_0111
//! ```
//!
//! i.e. the button was released at least six polls ago and has read
//! pressed for the last three, whatever it did in between.  The history is
//! then saturated so a held button reports once.

use embedded_hal::digital::InputPin;

/// Number of keypad buttons.
pub const BUTTONS: usize = 4;

const SETTLE_MASK: u8 = 0b1100_0111;
const SETTLE_PATTERN: u8 = 0b0000_0111;

/// Identity code entered by button `index`.
pub const fn button_code(index: usize) -> u8 {
    index as u8 + 1
}

#[derive(Debug, Default)]
pub struct Keypad {
    history: [u8; BUTTONS],
}

impl Keypad {
    pub const fn new() -> Self {
        Self {
            history: [0; BUTTONS],
        }
    }

    /// Shift in one poll's worth of levels (`true` = pressed).
    ///
    /// Returns a bitmask of buttons whose press settled on this poll.
    pub fn sample(&mut self, pressed: [bool; BUTTONS]) -> u8 {
        let mut settled = 0u8;
        for (i, (history, &down)) in self.history.iter_mut().zip(pressed.iter()).enumerate() {
            *history = (*history << 1) | u8::from(down);
            if *history & SETTLE_MASK == SETTLE_PATTERN {
                *history = 0xFF;
                settled |= 1 << i;
            }
        }
        settled
    }
}

/// Read active-low pins; a read error counts as released.
pub fn read_pressed<P: InputPin>(pins: &mut [P; BUTTONS]) -> [bool; BUTTONS] {
    let mut pressed = [false; BUTTONS];
    for (level, pin) in pressed.iter_mut().zip(pins.iter_mut()) {
        *level = pin.is_low().unwrap_or(false);
    }
    pressed
}
