//! Arming and intrusion alarm.
//!
//! ```text
//!            passcode                countdown expiry
//!  Disarmed ──────────▶ Countdown ────────────────────▶ Active
//!     ▲                     │                              │
//!     └──────── passcode ───┴────────── passcode ──────────┘
//! ```
//!
//! [`ArmingMachine`] runs in the keypad poll timer and is the only writer of
//! the phase and countdown.  [`ArmingState`] is the lock-free view shared
//! with the worker threads: the room engine reads the phase and reports
//! intrusions, the poll timer mirrors the alarm flag onto the sounder.
//!
//! The phase, the alarm flag and the per-slot alert bits share one atomic
//! session word, so an intrusion report either lands inside an active
//! session or not at all.  A disarm that races a report can never leave
//! the alarm raised.
//!
//! ```text
//!  31   28 27  25   24    23                          0
//! ┌───────┬──────┬───────┬─────────────────────────────┐
//! │ phase │  -   │ alarm │ alerted, one bit per slot   │
//! └───────┴──────┴───────┴─────────────────────────────┘
//! ```

pub mod machine;
pub mod passcode;

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::registry::{MAX_CAPACITY, SlotId};

pub use machine::{ArmingEvent, ArmingMachine};
pub use passcode::PasscodeEntry;

/// Arming phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArmingPhase {
    Disarmed = 0,
    Countdown = 1,
    Active = 2,
}

impl ArmingPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Countdown,
            2 => Self::Active,
            _ => Self::Disarmed,
        }
    }
}

const ALARM_BIT: u32 = 1 << MAX_CAPACITY;
const PHASE_SHIFT: u32 = 28;

const _: () = assert!(MAX_CAPACITY < PHASE_SHIFT as usize);

const fn session(phase: ArmingPhase) -> u32 {
    (phase as u32) << PHASE_SHIFT
}

fn phase_of(word: u32) -> ArmingPhase {
    ArmingPhase::from_u8((word >> PHASE_SHIFT) as u8)
}

/// Shared arming flags.
pub struct ArmingState {
    /// Phase, alarm flag and alert bits; see the module docs.
    session: AtomicU32,
    countdown: AtomicU16,
}

impl Default for ArmingState {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmingState {
    pub const fn new() -> Self {
        Self {
            session: AtomicU32::new(session(ArmingPhase::Disarmed)),
            countdown: AtomicU16::new(0),
        }
    }

    pub fn phase(&self) -> ArmingPhase {
        phase_of(self.session.load(Ordering::Acquire))
    }

    /// Armed in either the countdown or the active phase.
    pub fn is_armed(&self) -> bool {
        self.phase() != ArmingPhase::Disarmed
    }

    pub fn is_active(&self) -> bool {
        self.phase() == ArmingPhase::Active
    }

    /// Poll ticks left before the system goes active.
    pub fn countdown_remaining(&self) -> u16 {
        self.countdown.load(Ordering::Acquire)
    }

    pub fn alarm_raised(&self) -> bool {
        self.session.load(Ordering::Acquire) & ALARM_BIT != 0
    }

    /// Record presence in `slot` while active.
    ///
    /// Returns `true` only for the first report from that slot in the
    /// current arming session; that report raises the alarm.  The check and
    /// the update are one compare-and-swap on the session word.
    pub fn report_intrusion(&self, slot: SlotId) -> bool {
        let bit = 1u32 << (slot.index() % MAX_CAPACITY);
        self.session
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                if phase_of(word) != ArmingPhase::Active || word & bit != 0 {
                    None
                } else {
                    Some(word | bit | ALARM_BIT)
                }
            })
            .is_ok()
    }

    // ── Transitions (poll timer only) ─────────────────────────

    pub(crate) fn begin_countdown(&self, ticks: u16) {
        self.countdown.store(ticks, Ordering::Release);
        self.session
            .store(session(ArmingPhase::Countdown), Ordering::Release);
    }

    /// Decrement the countdown; returns the ticks left.
    pub(crate) fn tick_countdown(&self) -> u16 {
        let left = self.countdown_remaining().saturating_sub(1);
        self.countdown.store(left, Ordering::Release);
        left
    }

    pub(crate) fn activate(&self) {
        self.countdown.store(0, Ordering::Release);
        self.session
            .store(session(ArmingPhase::Active), Ordering::Release);
    }

    /// Clear the phase, the alarm and every alert bit in one store.
    pub(crate) fn disarm(&self) {
        self.session
            .store(session(ArmingPhase::Disarmed), Ordering::Release);
        self.countdown.store(0, Ordering::Release);
    }
}
