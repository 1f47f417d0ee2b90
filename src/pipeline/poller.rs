//! Keypad poll tick: keypad → arming machine → broadcast / sounder.
//!
//! Called from the poll timer every `poll_period_ms`.  Nothing here blocks:
//! the all-off broadcast uses `try_send` and is retried on the next tick
//! while the action mailbox is full.

use std::sync::Arc;

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::RadioLink;
use crate::app::service::Controller;
use crate::arming::{ArmingEvent, ArmingMachine};
use crate::drivers::alarm::AlarmOutput;
use crate::drivers::keypad::{BUTTONS, read_pressed};

pub struct KeypadPoller<P, A, L, const N: usize>
where
    P: InputPin,
    A: OutputPin,
    L: RadioLink,
{
    machine: ArmingMachine,
    buttons: [P; BUTTONS],
    alarm: AlarmOutput<A>,
    controller: Arc<Controller<L, N>>,
}

impl<P, A, L, const N: usize> KeypadPoller<P, A, L, N>
where
    P: InputPin,
    A: OutputPin,
    L: RadioLink,
{
    pub fn new(buttons: [P; BUTTONS], alarm: A, controller: Arc<Controller<L, N>>) -> Self {
        Self {
            machine: ArmingMachine::new(controller.config()),
            buttons,
            alarm: AlarmOutput::new(alarm),
            controller,
        }
    }

    /// One poll tick.
    pub fn poll(&mut self) -> Option<ArmingEvent> {
        let pressed = read_pressed(&mut self.buttons);
        let event = self.machine.tick(pressed, self.controller.arming());

        if self.machine.broadcast_pending() {
            if self.controller.request_all_off() {
                self.machine.broadcast_sent();
            } else {
                warn!("action mailbox full, all-off broadcast deferred");
            }
        }

        self.alarm.apply(self.controller.arming().alarm_raised());
        event
    }

    pub fn alarm_on(&self) -> bool {
        self.alarm.is_on()
    }
}
