//! Outbound remote AT command frames.
//!
//! Every frame the controller sends is a remote AT request:
//!
//! ```text
//! 7E  len(2)  17  id  long(8)  short(2)  02  cmd(2)  param(0..n)  chk
//! ```
//!
//! [`CommandEncoder`] turns an [`ActuatorCommand`] into one frame per
//! non-`NoOp` channel plus an optional status request.  Offs go first, then
//! Ons, each pass in light, heater, AC order.  [`provisioning_frames`] builds the start-up sequence
//! that configures every node's I/O lines by broadcast.

use heapless::Vec;

use crate::app::messages::{ActuatorCommand, Decision};
use crate::config::{ActuatorPins, ControllerConfig};
use crate::error::RadioError;
use crate::pins;
use crate::registry::NodeRef;

use super::{
    AT_CHANGE_DETECT, AT_IO_SAMPLE, AT_NETWORK_ADDRESS, AT_SAMPLE_RATE, BROADCAST_LONG_ADDRESS,
    BROADCAST_SHORT_ADDRESS, COMMAND_FRAME_ID, DIO_MODE_ANALOG, DIO_MODE_DIGITAL_IN,
    DIO_MODE_OUTPUT_HIGH, DIO_MODE_OUTPUT_LOW, FRAME_TYPE_REMOTE_AT_REQUEST, OPT_APPLY_CHANGES,
    START_DELIMITER, STATUS_REQUEST_FRAME_ID, at_dio, checksum,
};

/// Largest outbound frame.
pub const MAX_OUT_FRAME: usize = 32;

/// One encoded frame.
pub type FrameBuf = Vec<u8, MAX_OUT_FRAME>;

/// Frames produced for a single command (three channels + status poll).
pub const MAX_FRAMES_PER_COMMAND: usize = 4;

/// Frames in the provisioning sequence.
pub const PROVISIONING_FRAMES: usize = 8;

/// Fields of a remote AT request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAtRequest<'a> {
    pub frame_id: u8,
    pub long_address: u64,
    pub short_address: u16,
    pub command: [u8; 2],
    pub parameter: &'a [u8],
}

impl<'a> RemoteAtRequest<'a> {
    pub fn to_node(node: &NodeRef, frame_id: u8, command: [u8; 2], parameter: &'a [u8]) -> Self {
        Self {
            frame_id,
            long_address: node.long_address,
            short_address: node.short_address,
            command,
            parameter,
        }
    }

    pub fn broadcast(command: [u8; 2], parameter: &'a [u8]) -> Self {
        Self {
            frame_id: COMMAND_FRAME_ID,
            long_address: BROADCAST_LONG_ADDRESS,
            short_address: BROADCAST_SHORT_ADDRESS,
            command,
            parameter,
        }
    }

    /// Serialise into a complete frame including delimiter and checksum.
    pub fn encode(&self) -> Result<FrameBuf, RadioError> {
        let data_len = 15 + self.parameter.len();
        let mut out = FrameBuf::new();
        out.push(START_DELIMITER).map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(&(data_len as u16).to_be_bytes())
            .map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(&[FRAME_TYPE_REMOTE_AT_REQUEST, self.frame_id])
            .map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(&self.long_address.to_be_bytes())
            .map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(&self.short_address.to_be_bytes())
            .map_err(|_| RadioError::FrameTooLarge)?;
        out.push(OPT_APPLY_CHANGES).map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(&self.command)
            .map_err(|_| RadioError::FrameTooLarge)?;
        out.extend_from_slice(self.parameter)
            .map_err(|_| RadioError::FrameTooLarge)?;
        let chk = checksum(&out[super::HEADER_LEN..]);
        out.push(chk).map_err(|_| RadioError::FrameTooLarge)?;
        Ok(out)
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator commands
// ───────────────────────────────────────────────────────────────

pub struct CommandEncoder {
    pins: ActuatorPins,
}

impl CommandEncoder {
    pub fn new(pins: ActuatorPins) -> Self {
        Self { pins }
    }

    /// Digital-output frame driving `pin` on `node`.
    pub fn digital_output(node: &NodeRef, pin: u8, on: bool) -> Result<FrameBuf, RadioError> {
        let level = if on {
            DIO_MODE_OUTPUT_HIGH
        } else {
            DIO_MODE_OUTPUT_LOW
        };
        RemoteAtRequest::to_node(node, COMMAND_FRAME_ID, [b'D', pin], &[level]).encode()
    }

    /// Ask `node` for an immediate I/O sample.
    pub fn status_request(node: &NodeRef) -> Result<FrameBuf, RadioError> {
        RemoteAtRequest::to_node(node, STATUS_REQUEST_FRAME_ID, AT_IO_SAMPLE, &[]).encode()
    }

    /// Encode every frame `cmd` calls for, in transmit order.
    ///
    /// Every Off goes out before any On, so a heater/AC changeover never
    /// has both outputs high at once.
    pub fn encode(
        &self,
        cmd: &ActuatorCommand,
    ) -> Result<Vec<FrameBuf, MAX_FRAMES_PER_COMMAND>, RadioError> {
        let mut frames = Vec::new();
        let channels = [
            (self.pins.light, cmd.light),
            (self.pins.heater, cmd.heater),
            (self.pins.ac, cmd.ac),
        ];
        for wanted in [Decision::Off, Decision::On] {
            for (pin, decision) in channels {
                if decision != wanted {
                    continue;
                }
                frames
                    .push(Self::digital_output(&cmd.node, pin, wanted == Decision::On)?)
                    .map_err(|_| RadioError::FrameTooLarge)?;
            }
        }
        if cmd.status_request {
            frames
                .push(Self::status_request(&cmd.node)?)
                .map_err(|_| RadioError::FrameTooLarge)?;
        }
        Ok(frames)
    }
}

// ───────────────────────────────────────────────────────────────
// Provisioning
// ───────────────────────────────────────────────────────────────

/// Broadcast sequence configuring every node's sensor lines, change
/// detection on the threshold button, periodic sampling, and a network
/// address query whose responses register the nodes.
pub fn provisioning_frames(
    config: &ControllerConfig,
) -> Result<Vec<FrameBuf, PROVISIONING_FRAMES>, RadioError> {
    let button_mask = (1u16 << pins::NODE_BUTTON_DIO).to_be_bytes();
    let interval = config.sample_interval_ms.to_be_bytes();

    let mut frames = Vec::new();
    let requests = [
        RemoteAtRequest::broadcast(at_dio(pins::NODE_LIGHT_ADC), &[DIO_MODE_ANALOG]),
        RemoteAtRequest::broadcast(at_dio(pins::NODE_TEMP_ADC), &[DIO_MODE_ANALOG]),
        RemoteAtRequest::broadcast(at_dio(pins::NODE_POT_ADC), &[DIO_MODE_ANALOG]),
        RemoteAtRequest::broadcast(at_dio(pins::NODE_PIR_DIO), &[DIO_MODE_DIGITAL_IN]),
        RemoteAtRequest::broadcast(at_dio(pins::NODE_BUTTON_DIO), &[DIO_MODE_DIGITAL_IN]),
        RemoteAtRequest::broadcast(AT_NETWORK_ADDRESS, &[]),
        RemoteAtRequest::broadcast(AT_CHANGE_DETECT, &button_mask),
        RemoteAtRequest::broadcast(AT_SAMPLE_RATE, &interval),
    ];
    for request in &requests {
        frames
            .push(request.encode()?)
            .map_err(|_| RadioError::FrameTooLarge)?;
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SlotId;

    fn node() -> NodeRef {
        NodeRef {
            slot: SlotId::new(0),
            long_address: 0x0013_A200_4172_79,
            short_address: 0xFCC9,
        }
    }

    #[test]
    fn broadcast_analog_frame_matches_reference() {
        let frame = RemoteAtRequest::broadcast(*b"D0", &[0x02]).encode().unwrap();
        assert_eq!(
            frame.as_slice(),
            &[
                0x7E, 0x00, 0x10, 0x17, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF,
                0xFF, 0xFE, 0x02, 0x44, 0x30, 0x02, 0x74
            ]
        );
    }

    #[test]
    fn status_request_uses_reserved_frame_id() {
        let n = NodeRef {
            long_address: BROADCAST_LONG_ADDRESS,
            short_address: BROADCAST_SHORT_ADDRESS,
            ..node()
        };
        let frame = CommandEncoder::status_request(&n).unwrap();
        assert_eq!(
            frame.as_slice(),
            &[
                0x7E, 0x00, 0x0F, 0x17, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF,
                0xFF, 0xFE, 0x02, 0x49, 0x53, 0xFA
            ]
        );
    }

    #[test]
    fn light_only_command_yields_one_frame() {
        let enc = CommandEncoder::new(ActuatorPins::default());
        let cmd = ActuatorCommand::set(node(), Decision::On, Decision::NoOp, Decision::NoOp);
        let frames = enc.encode(&cmd).unwrap();
        assert_eq!(frames.len(), 1);
        let f = &frames[0];
        assert_eq!(&f[5..13], &0x0013_A200_4172_79u64.to_be_bytes());
        assert_eq!(&f[13..15], &[0xFC, 0xC9]);
        assert_eq!(&f[16..19], &[b'D', b'2', DIO_MODE_OUTPUT_HIGH]);
        assert_eq!(checksum(&f[3..f.len() - 1]), f[f.len() - 1]);
    }

    #[test]
    fn offs_precede_ons_then_status() {
        let enc = CommandEncoder::new(ActuatorPins::default());
        let mut cmd = ActuatorCommand::set(node(), Decision::Off, Decision::On, Decision::Off);
        cmd.status_request = true;
        let frames = enc.encode(&cmd).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(&frames[0][16..19], &[b'D', b'2', DIO_MODE_OUTPUT_LOW]);
        assert_eq!(&frames[1][16..19], &[b'D', b'6', DIO_MODE_OUTPUT_LOW]);
        assert_eq!(&frames[2][16..19], &[b'D', b'5', DIO_MODE_OUTPUT_HIGH]);
        assert_eq!(frames[3][4], STATUS_REQUEST_FRAME_ID);
    }

    #[test]
    fn ac_to_heater_changeover_switches_ac_off_first() {
        let enc = CommandEncoder::new(ActuatorPins::default());
        let cmd = ActuatorCommand::set(node(), Decision::NoOp, Decision::On, Decision::Off);
        let frames = enc.encode(&cmd).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][16..19], &[b'D', b'6', DIO_MODE_OUTPUT_LOW]);
        assert_eq!(&frames[1][16..19], &[b'D', b'5', DIO_MODE_OUTPUT_HIGH]);
    }

    #[test]
    fn noop_command_yields_nothing() {
        let enc = CommandEncoder::new(ActuatorPins::default());
        let cmd = ActuatorCommand::set(node(), Decision::NoOp, Decision::NoOp, Decision::NoOp);
        assert!(enc.encode(&cmd).unwrap().is_empty());
    }

    #[test]
    fn provisioning_sequence() {
        let frames = provisioning_frames(&ControllerConfig::default()).unwrap();
        assert_eq!(frames.len(), PROVISIONING_FRAMES);
        assert_eq!(&frames[3][16..19], &[b'D', b'3', DIO_MODE_DIGITAL_IN]);
        assert_eq!(&frames[5][16..18], b"MY");
        // IC: button on DIO4
        assert_eq!(&frames[6][16..20], &[b'I', b'C', 0x00, 0x10]);
        // IR: 2000 ms
        assert_eq!(&frames[7][16..20], &[b'I', b'R', 0x07, 0xD0]);
        assert_eq!(frames[7][2], 0x11);
        for f in &frames {
            assert_eq!(checksum(&f[3..f.len() - 1]), f[f.len() - 1]);
        }
    }
}
