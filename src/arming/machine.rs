//! Keypad-driven arming state machine, stepped once per poll tick.

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::drivers::keypad::{BUTTONS, Keypad, button_code};

use super::{ArmingPhase, ArmingState, PasscodeEntry};

/// Transitions reported by [`ArmingMachine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingEvent {
    /// Correct passcode while disarmed; countdown started.
    Armed,
    /// Correct passcode while armed.
    Disarmed,
    /// Countdown expired.
    Activated,
}

pub struct ArmingMachine {
    keypad: Keypad,
    passcode: PasscodeEntry,
    countdown_ticks: u16,
    /// All-off broadcast owed since activation and not yet queued.
    broadcast_pending: bool,
}

impl ArmingMachine {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            keypad: Keypad::new(),
            passcode: PasscodeEntry::new(config.passcode, config.passcode_timeout_ticks()),
            countdown_ticks: config.countdown_ticks(),
            broadcast_pending: false,
        }
    }

    /// One poll: debounce `pressed`, feed the passcode, run the countdown.
    pub fn tick(&mut self, pressed: [bool; BUTTONS], state: &ArmingState) -> Option<ArmingEvent> {
        let settled = self.keypad.sample(pressed);
        self.passcode.tick();

        let mut event = None;
        for index in 0..BUTTONS {
            if settled & (1 << index) != 0 && self.passcode.push(button_code(index)) {
                event = Some(self.toggle(state));
            }
        }
        if event.is_some() {
            return event;
        }

        if state.phase() == ArmingPhase::Countdown && state.tick_countdown() == 0 {
            state.activate();
            self.broadcast_pending = true;
            warn!("ARMED: system active, forcing all actuators off");
            return Some(ArmingEvent::Activated);
        }
        None
    }

    fn toggle(&mut self, state: &ArmingState) -> ArmingEvent {
        if state.is_armed() {
            state.disarm();
            self.broadcast_pending = false;
            info!("Disarmed");
            ArmingEvent::Disarmed
        } else {
            state.begin_countdown(self.countdown_ticks);
            info!("Arming: {} tick countdown", self.countdown_ticks);
            ArmingEvent::Armed
        }
    }

    pub fn broadcast_pending(&self) -> bool {
        self.broadcast_pending
    }

    /// The all-off broadcast was queued.
    pub fn broadcast_sent(&mut self) {
        self.broadcast_pending = false;
    }
}
