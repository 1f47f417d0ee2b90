//! Messages exchanged between pipeline stages.
//!
//! Every message is `Copy` and carries node identity by value, so a
//! mailbox slot never borrows from the registry.

use crate::config::Scaling;
use crate::registry::{NodeRef, SlotId};

// ───────────────────────────────────────────────────────────────
// Dispatcher → Room Control
// ───────────────────────────────────────────────────────────────

/// Raw periodic report from one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub node: SlotId,
    pub presence: bool,
    pub light_code: u16,
    pub temp_code: u16,
    /// Monotonic arrival time (ms since boot).
    pub received_at_ms: u64,
}

/// A sample converted to engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub presence: bool,
    pub light_percent: u8,
    pub temperature_c: i16,
}

impl Sample {
    pub fn reading(&self, scaling: &Scaling) -> Reading {
        Reading {
            presence: self.presence,
            light_percent: scaling.light_percent(self.light_code),
            temperature_c: scaling.temperature_c(self.temp_code),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher → Threshold engine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdInput {
    /// The node's threshold button was pressed; its pot must be read.
    EditRequested,
    /// Potentiometer position (percent) from a status response.
    Pot(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdEvent {
    pub node: SlotId,
    pub input: ThresholdInput,
}

// ───────────────────────────────────────────────────────────────
// Engines → Action worker
// ───────────────────────────────────────────────────────────────

/// Per-channel actuator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    Off,
    On,
    #[default]
    NoOp,
}

impl Decision {
    pub fn is_noop(self) -> bool {
        self == Self::NoOp
    }
}

/// Decisions for one node, plus an optional status-request poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub node: NodeRef,
    pub light: Decision,
    pub heater: Decision,
    pub ac: Decision,
    pub status_request: bool,
}

impl ActuatorCommand {
    pub fn set(node: NodeRef, light: Decision, heater: Decision, ac: Decision) -> Self {
        Self {
            node,
            light,
            heater,
            ac,
            status_request: false,
        }
    }

    /// Ask the node to report its current inputs (pot reading).
    pub fn status_request(node: NodeRef) -> Self {
        Self {
            node,
            light: Decision::NoOp,
            heater: Decision::NoOp,
            ac: Decision::NoOp,
            status_request: true,
        }
    }

    /// True when encoding would produce no frames.
    pub fn is_noop(&self) -> bool {
        self.light.is_noop() && self.heater.is_noop() && self.ac.is_noop() && !self.status_request
    }
}

/// Work item for the action worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMsg {
    Command(ActuatorCommand),
    /// Force every actuator on every registered node off.
    AllOff,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> NodeRef {
        NodeRef {
            slot: SlotId::new(0),
            long_address: 1,
            short_address: 2,
        }
    }

    #[test]
    fn noop_detection() {
        let n = node();
        assert!(ActuatorCommand::set(n, Decision::NoOp, Decision::NoOp, Decision::NoOp).is_noop());
        assert!(!ActuatorCommand::set(n, Decision::Off, Decision::NoOp, Decision::NoOp).is_noop());
        assert!(!ActuatorCommand::status_request(n).is_noop());
    }

    #[test]
    fn sample_reading_uses_scaling() {
        let sample = Sample {
            node: SlotId::new(0),
            presence: true,
            light_code: 377,
            temp_code: 597,
            received_at_ms: 0,
        };
        let r = sample.reading(&Scaling::default());
        assert_eq!(r.light_percent, 30);
        assert_eq!(r.temperature_c, 20);
        assert!(r.presence);
    }
}
