//! Presence history and edge classification.
//!
//! The PIR line is sampled once per report.  A bare boolean cannot tell a
//! room that was just entered from one that has been occupied for a while,
//! and the light and thermal rules treat those differently, so the last
//! four samples are kept in a shift register (newest in bit 0).

/// Number of presence samples retained.
pub const HISTORY_LEN: u8 = 4;
const HISTORY_MASK: u8 = (1 << HISTORY_LEN) - 1;

/// Presence transition derived from the two newest samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    JustEntered,
    StillOccupied,
    JustLeft,
    StillVacant,
}

impl Occupancy {
    /// True for both occupied classifications.
    pub fn is_occupied(self) -> bool {
        matches!(self, Self::JustEntered | Self::StillOccupied)
    }
}

/// Four-sample presence shift register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyHistory(u8);

impl OccupancyHistory {
    /// Build a history from samples listed oldest first.
    pub fn from_samples(samples: [bool; HISTORY_LEN as usize]) -> Self {
        let bits = samples
            .iter()
            .fold(0u8, |acc, &present| (acc << 1) | u8::from(present));
        Self(bits)
    }

    /// Shift in the newest sample.
    pub fn push(&mut self, present: bool) {
        self.0 = ((self.0 << 1) | u8::from(present)) & HISTORY_MASK;
    }

    /// Raw register contents (newest sample in bit 0).
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn classify(self) -> Occupancy {
        match self.0 & 0b11 {
            0b01 => Occupancy::JustEntered,
            0b11 => Occupancy::StillOccupied,
            0b10 => Occupancy::JustLeft,
            _ => Occupancy::StillVacant,
        }
    }
}
