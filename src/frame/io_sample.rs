//! I/O sample payload carried by `IS` responses.
//!
//! ```text
//! ┌───────┬──────────────┬─────────────┬──────────────────┬─────────────────────┐
//! │ Sets  │ Digital mask │ Analog mask │ Digital samples  │ Analog samples      │
//! │ 1 B   │ 2 B BE       │ 1 B         │ 2 B (if mask≠0)  │ 2 B per enabled ch. │
//! └───────┴──────────────┴─────────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! Analog samples appear in ascending channel order for every bit set in
//! the analog mask.

use crate::error::FrameError;

use super::read_u16_be;

/// Analog channels the radio can report (AD0–AD3).
pub const ANALOG_CHANNELS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoSample {
    pub digital_mask: u16,
    pub analog_mask: u8,
    pub digital: u16,
    analog: [Option<u16>; ANALOG_CHANNELS],
}

impl IoSample {
    /// Decode the sample data that follows the AT status byte.
    pub fn parse(data: &[u8]) -> Result<Self, FrameError> {
        let digital_mask = read_u16_be(data, 1).ok_or(FrameError::Truncated)?;
        let analog_mask = *data.get(3).ok_or(FrameError::Truncated)?;

        let mut at = 4;
        let digital = if digital_mask == 0 {
            0
        } else {
            let d = read_u16_be(data, at).ok_or(FrameError::Truncated)?;
            at += 2;
            d
        };

        let mut analog = [None; ANALOG_CHANNELS];
        for (channel, slot) in analog.iter_mut().enumerate() {
            if analog_mask & (1 << channel) != 0 {
                *slot = Some(read_u16_be(data, at).ok_or(FrameError::Truncated)?);
                at += 2;
            }
        }

        Ok(Self {
            digital_mask,
            analog_mask,
            digital,
            analog,
        })
    }

    /// Level of digital line `line`, if the line was sampled.
    pub fn digital(&self, line: u8) -> Option<bool> {
        let bit = 1u16 << line;
        (self.digital_mask & bit != 0).then_some(self.digital & bit != 0)
    }

    /// Raw code of analog channel `channel`, if it was sampled.
    pub fn analog(&self, channel: u8) -> Option<u16> {
        self.analog.get(usize::from(channel)).copied().flatten()
    }

    pub fn has_analog(&self) -> bool {
        self.analog_mask != 0
    }
}
