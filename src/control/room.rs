//! Room control engine: occupancy-driven lighting and heating/cooling.
//!
//! Each sample shifts the presence bit into the room's history, then the
//! lighting and thermal channels are decided independently.  Both channels
//! are latched: a command is emitted once per threshold crossing, never
//! once per sample.
//!
//! ## Lighting
//!
//! | Occupancy | Light vs threshold | Latch      | Decision         |
//! |-----------|--------------------|------------|------------------|
//! | vacant    | any                | OnSent     | Off → OffSent    |
//! | occupied  | below              | not OnSent | On → OnSent      |
//! | occupied  | at/above           | OnSent     | Off → OffSent    |
//! | otherwise |                    |            | NoOp             |
//!
//! ## Heating / cooling
//!
//! The heater and AC share one three-way latch, so at most one of them is
//! on.  A thermal override on either channel suspends the pair.

use log::{debug, info, warn};

use crate::app::messages::{ActuatorCommand, Decision, Reading, Sample};
use crate::arming::ArmingState;
use crate::config::Scaling;
use crate::registry::{LightLatch, RoomRecord, SlotId, ThermalLatch};

use super::occupancy::Occupancy;

/// Decisions for the three channels of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomDecision {
    pub light: Decision,
    pub heater: Decision,
    pub ac: Decision,
}

impl RoomDecision {
    pub fn is_noop(&self) -> bool {
        self.light.is_noop() && self.heater.is_noop() && self.ac.is_noop()
    }
}

/// Shift the sample into the history and decide every channel.
pub fn evaluate(record: &mut RoomRecord, reading: &Reading) -> RoomDecision {
    record.occupancy.push(reading.presence);
    let occupancy = record.occupancy.classify();

    let light = if record.light_override {
        Decision::NoOp
    } else {
        decide_light(record, occupancy, reading.light_percent)
    };

    let (heater, ac) = if record.thermal_overridden() {
        (Decision::NoOp, Decision::NoOp)
    } else {
        decide_thermal(record, occupancy, reading.temperature_c)
    };

    RoomDecision { light, heater, ac }
}

fn decide_light(record: &mut RoomRecord, occupancy: Occupancy, light_percent: u8) -> Decision {
    let latched_on = record.light_latch == LightLatch::OnSent;
    let dark = light_percent < record.light_threshold;

    let decision = match (occupancy.is_occupied(), dark, latched_on) {
        (false, _, true) | (true, false, true) => Decision::Off,
        (true, true, false) => Decision::On,
        _ => Decision::NoOp,
    };
    match decision {
        Decision::On => record.light_latch = LightLatch::OnSent,
        Decision::Off => record.light_latch = LightLatch::OffSent,
        Decision::NoOp => {}
    }
    decision
}

fn decide_thermal(
    record: &mut RoomRecord,
    occupancy: Occupancy,
    temperature_c: i16,
) -> (Decision, Decision) {
    let latch = record.thermal_latch;

    let target = if !occupancy.is_occupied() {
        ThermalLatch::Neither
    } else if temperature_c < i16::from(record.lower_heat_threshold) {
        ThermalLatch::HeaterOn
    } else if temperature_c > i16::from(record.upper_heat_threshold) {
        ThermalLatch::AcOn
    } else {
        ThermalLatch::Neither
    };

    if target == latch {
        return (Decision::NoOp, Decision::NoOp);
    }
    record.thermal_latch = target;

    // Emit only the deltas between the latched and target states.
    let heater = match (latch, target) {
        (_, ThermalLatch::HeaterOn) => Decision::On,
        (ThermalLatch::HeaterOn, _) => Decision::Off,
        _ => Decision::NoOp,
    };
    let ac = match (latch, target) {
        (_, ThermalLatch::AcOn) => Decision::On,
        (ThermalLatch::AcOn, _) => Decision::Off,
        _ => Decision::NoOp,
    };
    (heater, ac)
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// What one sample did to a room.
///
/// Built under the registry lock; [`RoomOutcome::log`] runs after it is
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOutcome {
    /// Armed and presence seen for the first time this session.
    Intrusion(SlotId),
    /// Armed, nothing new to report.
    Suppressed,
    Unchanged { slot: SlotId, reading: Reading },
    Command { command: ActuatorCommand, reading: Reading },
}

impl RoomOutcome {
    pub fn command(&self) -> Option<ActuatorCommand> {
        match self {
            Self::Command { command, .. } => Some(*command),
            _ => None,
        }
    }

    pub fn log(&self) {
        match self {
            Self::Intrusion(slot) => {
                warn!("INTRUSION: presence in slot {} while armed", slot.index());
            }
            Self::Suppressed => {}
            Self::Unchanged { slot, reading } => debug!(
                "slot {}: no change (light {}%, {} °C)",
                slot.index(),
                reading.light_percent,
                reading.temperature_c
            ),
            Self::Command { command, reading } => info!(
                "slot {}: light {:?} heater {:?} ac {:?} (light {}%, {} °C)",
                command.node.slot.index(),
                command.light,
                command.heater,
                command.ac,
                reading.light_percent,
                reading.temperature_c
            ),
        }
    }
}

/// Sample handler combining scaling, the arming gate, and [`evaluate`].
pub struct RoomControlEngine {
    scaling: Scaling,
}

impl RoomControlEngine {
    pub fn new(scaling: Scaling) -> Self {
        Self { scaling }
    }

    /// Process one sample for `record`.
    ///
    /// Only [`RoomOutcome::Command`] carries something to publish; every
    /// channel NoOp or a fully armed system yields one of the other variants.
    pub fn process(
        &self,
        record: &mut RoomRecord,
        sample: &Sample,
        arming: &ArmingState,
    ) -> RoomOutcome {
        let reading = sample.reading(&self.scaling);

        if arming.is_active() {
            record.occupancy.push(reading.presence);
            if reading.presence && arming.report_intrusion(record.id) {
                return RoomOutcome::Intrusion(record.id);
            }
            return RoomOutcome::Suppressed;
        }

        let decision = evaluate(record, &reading);
        if decision.is_noop() {
            return RoomOutcome::Unchanged {
                slot: record.id,
                reading,
            };
        }
        RoomOutcome::Command {
            command: ActuatorCommand::set(
                record.node_ref(),
                decision.light,
                decision.heater,
                decision.ac,
            ),
            reading,
        }
    }
}
