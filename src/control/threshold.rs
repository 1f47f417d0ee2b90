//! Threshold / override engine: one potentiometer, three functions.
//!
//! A press of the node's threshold button makes the controller poll the
//! node's status; the potentiometer position in the response then selects
//! an action by band:
//!
//! | Reading   | Action                                          |
//! |-----------|-------------------------------------------------|
//! | edit armed| commit reading to the selected setpoint         |
//! | < 25      | arm edit (the next reading is committed)        |
//! | 25 .. 66  | toggle the selected channel's override          |
//! | ≥ 66      | advance the selector Light → Heating → Ac       |

use log::info;

use crate::app::messages::{ActuatorCommand, Decision, ThresholdInput};
use crate::registry::{LightLatch, RoomRecord, Selector, SlotId, ThermalLatch};

/// Readings below this arm edit mode.
pub const EDIT_BAND_MAX: u8 = 25;
/// Readings below this (and at least [`EDIT_BAND_MAX`]) toggle an override.
pub const OVERRIDE_BAND_MAX: u8 = 66;

/// Setpoint ceiling (percent / °C).
const SETPOINT_MAX: u8 = 100;

/// What one threshold event did to a room.
///
/// Built under the registry lock; [`ThresholdOutcome::log`] runs after it
/// is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOutcome {
    /// Button press: poll the node for its potentiometer.
    Poll(ActuatorCommand),
    EditArmed { slot: SlotId, selector: Selector },
    Committed {
        slot: SlotId,
        light: u8,
        lower_heat: u8,
        upper_heat: u8,
    },
    Selected { slot: SlotId, selector: Selector },
    Override {
        selector: Selector,
        enabled: bool,
        command: ActuatorCommand,
    },
}

impl ThresholdOutcome {
    pub fn command(&self) -> Option<ActuatorCommand> {
        match self {
            Self::Poll(command) | Self::Override { command, .. } => Some(*command),
            _ => None,
        }
    }

    pub fn log(&self) {
        match self {
            Self::Poll(_) => {}
            Self::EditArmed { slot, selector } => {
                info!("slot {}: editing {:?} threshold", slot.index(), selector);
            }
            Self::Committed {
                slot,
                light,
                lower_heat,
                upper_heat,
            } => info!(
                "slot {}: thresholds light {}% heat {}..{} °C",
                slot.index(),
                light,
                lower_heat,
                upper_heat
            ),
            Self::Selected { slot, selector } => {
                info!("slot {}: selector -> {:?}", slot.index(), selector);
            }
            Self::Override {
                selector,
                enabled,
                command,
            } => info!(
                "slot {}: {:?} override {}",
                command.node.slot.index(),
                selector,
                if *enabled { "ON" } else { "OFF" }
            ),
        }
    }
}

pub struct ThresholdEngine {
    band_margin: u8,
}

impl ThresholdEngine {
    pub fn new(band_margin: u8) -> Self {
        Self {
            band_margin: band_margin.clamp(1, SETPOINT_MAX),
        }
    }

    /// Apply one threshold event to `record`.
    pub fn handle(&self, record: &mut RoomRecord, input: ThresholdInput) -> ThresholdOutcome {
        let reading = match input {
            ThresholdInput::EditRequested => {
                return ThresholdOutcome::Poll(ActuatorCommand::status_request(record.node_ref()));
            }
            ThresholdInput::Pot(reading) => reading.min(SETPOINT_MAX),
        };

        if record.edit.edit_armed {
            record.edit.edit_armed = false;
            self.commit(record, reading);
            ThresholdOutcome::Committed {
                slot: record.id,
                light: record.light_threshold,
                lower_heat: record.lower_heat_threshold,
                upper_heat: record.upper_heat_threshold,
            }
        } else if reading < EDIT_BAND_MAX {
            record.edit.edit_armed = true;
            ThresholdOutcome::EditArmed {
                slot: record.id,
                selector: record.edit.selector,
            }
        } else if reading < OVERRIDE_BAND_MAX {
            toggle_override(record)
        } else {
            record.edit.selector = record.edit.selector.next();
            ThresholdOutcome::Selected {
                slot: record.id,
                selector: record.edit.selector,
            }
        }
    }

    /// Store `value` in the selected setpoint, keeping the heating band at
    /// least `band_margin` wide.
    fn commit(&self, record: &mut RoomRecord, value: u8) {
        let margin = self.band_margin;
        match record.edit.selector {
            Selector::Light => record.light_threshold = value,
            Selector::Heating => {
                let lower = value.min(SETPOINT_MAX - margin);
                record.lower_heat_threshold = lower;
                if lower + margin > record.upper_heat_threshold {
                    record.upper_heat_threshold = lower + margin;
                }
            }
            Selector::Ac => {
                let upper = value.max(margin);
                record.upper_heat_threshold = upper;
                if upper < record.lower_heat_threshold + margin {
                    record.lower_heat_threshold = upper - margin;
                }
            }
        }
    }
}

fn toggle_override(record: &mut RoomRecord) -> ThresholdOutcome {
    use Decision::{NoOp, Off, On};

    let node = record.node_ref();
    let (enabled, command) = match record.edit.selector {
        Selector::Light => {
            record.light_override = !record.light_override;
            if !record.light_override {
                record.light_latch = LightLatch::OffSent;
            }
            let light = if record.light_override { On } else { Off };
            (record.light_override, ActuatorCommand::set(node, light, NoOp, NoOp))
        }
        Selector::Heating => {
            record.heating_override = !record.heating_override;
            let cmd = if record.heating_override {
                ActuatorCommand::set(node, NoOp, On, Off)
            } else {
                record.thermal_latch = ThermalLatch::Neither;
                ActuatorCommand::set(node, NoOp, Off, NoOp)
            };
            (record.heating_override, cmd)
        }
        Selector::Ac => {
            record.ac_override = !record.ac_override;
            let cmd = if record.ac_override {
                ActuatorCommand::set(node, NoOp, Off, On)
            } else {
                record.thermal_latch = ThermalLatch::Neither;
                ActuatorCommand::set(node, NoOp, NoOp, Off)
            };
            (record.ac_override, cmd)
        }
    };
    ThresholdOutcome::Override {
        selector: record.edit.selector,
        enabled,
        command,
    }
}
