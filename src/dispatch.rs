//! Frame dispatcher: classifies each validated inbound frame.
//!
//! | Frame                                   | Outcome                         |
//! |-----------------------------------------|---------------------------------|
//! | `MY` response                           | register / relearn node address |
//! | `IS` response, frame id ≠ status id     | periodic [`Sample`]             |
//! | `IS` digital-only, button asserted      | [`ThresholdInput::EditRequested`] |
//! | `IS` response, frame id = status id     | [`ThresholdInput::Pot`]         |
//!
//! Anything else is reported as a [`FrameError`] and dropped by the
//! caller; the dispatcher never panics on wire data.

use log::{debug, info, warn};

use crate::app::messages::{Sample, ThresholdEvent, ThresholdInput};
use crate::config::Scaling;
use crate::error::{Error, FrameError};
use crate::frame::{
    AT_IO_SAMPLE, AT_NETWORK_ADDRESS, FRAME_TYPE_REMOTE_AT_RESPONSE, IoSample,
    STATUS_REQUEST_FRAME_ID, offsets, read_u16_be, read_u64_be,
};
use crate::pins;
use crate::registry::{SharedRegistry, SlotId};

/// What a frame turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A new node was given a slot.
    Registered(SlotId),
    /// A known node re-announced; its network address was refreshed.
    Relearned(SlotId),
    Sample(Sample),
    Threshold(ThresholdEvent),
    /// Well-formed but carries nothing the controller acts on.
    Ignored,
}

pub struct FrameDispatcher {
    scaling: Scaling,
}

impl FrameDispatcher {
    pub fn new(scaling: Scaling) -> Self {
        Self { scaling }
    }

    /// Classify `frame` (complete, checksum-valid, delimiter included).
    pub fn dispatch<const N: usize>(
        &self,
        registry: &SharedRegistry<N>,
        frame: &[u8],
        now_ms: u64,
    ) -> Result<Dispatch, Error> {
        let frame_type = *frame.get(offsets::FRAME_TYPE).ok_or(FrameError::Truncated)?;
        if frame_type != FRAME_TYPE_REMOTE_AT_RESPONSE {
            return Err(FrameError::UnsupportedType(frame_type).into());
        }
        let frame_id = *frame.get(offsets::FRAME_ID).ok_or(FrameError::Truncated)?;
        let long_address =
            read_u64_be(frame, offsets::LONG_ADDRESS).ok_or(FrameError::Truncated)?;
        let short_address =
            read_u16_be(frame, offsets::SHORT_ADDRESS).ok_or(FrameError::Truncated)?;
        let command = frame
            .get(offsets::AT_COMMAND..offsets::AT_COMMAND + 2)
            .ok_or(FrameError::Truncated)?;
        let command = [command[0], command[1]];
        let status = *frame.get(offsets::STATUS).ok_or(FrameError::Truncated)?;
        if status != 0 {
            return Err(FrameError::CommandStatus(status).into());
        }
        // Command data runs up to, not including, the checksum.
        let data = frame
            .get(offsets::DATA..frame.len().saturating_sub(1))
            .unwrap_or(&[]);

        match command {
            AT_NETWORK_ADDRESS => {
                let assigned = read_u16_be(data, 0).unwrap_or(short_address);
                self.announce(registry, long_address, assigned)
            }
            AT_IO_SAMPLE => {
                let io = IoSample::parse(data)?;
                let slot = registry
                    .with(|r| r.lookup_by_short(short_address))
                    .ok_or(FrameError::UnknownNode(short_address))?;
                if frame_id == STATUS_REQUEST_FRAME_ID {
                    self.status_response(slot, &io)
                } else {
                    Self::report(slot, &io, now_ms)
                }
            }
            other => Err(FrameError::UnsupportedCommand(other).into()),
        }
    }

    fn announce<const N: usize>(
        &self,
        registry: &SharedRegistry<N>,
        long_address: u64,
        short_address: u16,
    ) -> Result<Dispatch, Error> {
        let (slot, outcome, stale) = registry.with_mut(
            |reg| -> Result<(SlotId, Dispatch, Option<SlotId>), Error> {
                let (slot, outcome) = match reg.find_by_long(long_address) {
                    Some(slot) => (slot, Dispatch::Relearned(slot)),
                    None => {
                        let slot = reg.register(long_address)?;
                        (slot, Dispatch::Registered(slot))
                    }
                };
                let stale = reg.relearn_short(slot, short_address);
                Ok((slot, outcome, stale))
            },
        )?;

        // Logged once the registry lock is released.
        if let Some(stale) = stale {
            warn!(
                "address 0x{:04X} moved from slot {} to slot {}",
                short_address,
                stale.index(),
                slot.index()
            );
        }
        match outcome {
            Dispatch::Registered(_) => info!(
                "node 0x{:016X} registered in slot {} (addr 0x{:04X})",
                long_address,
                slot.index(),
                short_address
            ),
            _ => debug!(
                "node 0x{:016X} re-announced (slot {}, addr 0x{:04X})",
                long_address,
                slot.index(),
                short_address
            ),
        }
        Ok(outcome)
    }

    fn report(slot: SlotId, io: &IoSample, now_ms: u64) -> Result<Dispatch, Error> {
        if io.has_analog() {
            let presence = io.digital(pins::NODE_PIR_DIO).ok_or(FrameError::MissingChannel)?;
            let light_code = io
                .analog(pins::NODE_LIGHT_ADC)
                .ok_or(FrameError::MissingChannel)?;
            let temp_code = io
                .analog(pins::NODE_TEMP_ADC)
                .ok_or(FrameError::MissingChannel)?;
            return Ok(Dispatch::Sample(Sample {
                node: slot,
                presence,
                light_code,
                temp_code,
                received_at_ms: now_ms,
            }));
        }

        // Change-detect report: only a button press matters.
        if io.digital(pins::NODE_BUTTON_DIO) == Some(true) {
            debug!("threshold button on slot {}", slot.index());
            return Ok(Dispatch::Threshold(ThresholdEvent {
                node: slot,
                input: ThresholdInput::EditRequested,
            }));
        }
        Ok(Dispatch::Ignored)
    }

    fn status_response(&self, slot: SlotId, io: &IoSample) -> Result<Dispatch, Error> {
        let code = io
            .analog(pins::NODE_POT_ADC)
            .ok_or(FrameError::MissingChannel)?;
        Ok(Dispatch::Threshold(ThresholdEvent {
            node: slot,
            input: ThresholdInput::Pot(self.scaling.pot_percent(code)),
        }))
    }
}

// ───────────────────────────────────────────────────────────────
// Test frame builders (shared with the integration tests)
// ───────────────────────────────────────────────────────────────

/// Builders for well-formed inbound frames.
#[doc(hidden)]
pub mod testing {
    use std::vec::Vec;

    use crate::frame::{FRAME_TYPE_REMOTE_AT_RESPONSE, START_DELIMITER, checksum};
    use crate::pins;

    /// Wrap response fields in a complete frame.
    pub fn response(
        frame_id: u8,
        long_address: u64,
        short_address: u16,
        command: [u8; 2],
        status: u8,
        data: &[u8],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.push(FRAME_TYPE_REMOTE_AT_RESPONSE);
        body.push(frame_id);
        body.extend_from_slice(&long_address.to_be_bytes());
        body.extend_from_slice(&short_address.to_be_bytes());
        body.extend_from_slice(&command);
        body.push(status);
        body.extend_from_slice(data);

        let mut frame = Vec::with_capacity(body.len() + 4);
        frame.push(START_DELIMITER);
        frame.extend_from_slice(&(body.len() as u16).to_be_bytes());
        frame.extend_from_slice(&body);
        frame.push(checksum(&body));
        frame
    }

    /// `MY` response announcing `short_address`.
    pub fn announce(long_address: u64, short_address: u16) -> Vec<u8> {
        response(
            0x01,
            long_address,
            short_address,
            *b"MY",
            0,
            &short_address.to_be_bytes(),
        )
    }

    /// Periodic report with PIR, light and temperature.
    pub fn sample(
        long_address: u64,
        short_address: u16,
        presence: bool,
        light_code: u16,
        temp_code: u16,
    ) -> Vec<u8> {
        let dmask: u16 = (1 << pins::NODE_PIR_DIO) | (1 << pins::NODE_BUTTON_DIO);
        let amask: u8 = (1 << pins::NODE_LIGHT_ADC) | (1 << pins::NODE_TEMP_ADC);
        let digital: u16 = if presence { 1 << pins::NODE_PIR_DIO } else { 0 };
        let mut data = vec![0x01];
        data.extend_from_slice(&dmask.to_be_bytes());
        data.push(amask);
        data.extend_from_slice(&digital.to_be_bytes());
        data.extend_from_slice(&light_code.to_be_bytes());
        data.extend_from_slice(&temp_code.to_be_bytes());
        response(0x00, long_address, short_address, *b"IS", 0, &data)
    }

    /// Change-detect report carrying the button line only.
    pub fn button(long_address: u64, short_address: u16, pressed: bool) -> Vec<u8> {
        let dmask: u16 = 1 << pins::NODE_BUTTON_DIO;
        let digital: u16 = if pressed { dmask } else { 0 };
        let mut data = vec![0x01];
        data.extend_from_slice(&dmask.to_be_bytes());
        data.push(0x00);
        data.extend_from_slice(&digital.to_be_bytes());
        response(0x00, long_address, short_address, *b"IS", 0, &data)
    }

    /// Status response carrying the potentiometer code.
    pub fn pot(long_address: u64, short_address: u16, pot_code: u16) -> Vec<u8> {
        let mut data = vec![0x01, 0x00, 0x00, 1 << pins::NODE_POT_ADC];
        data.extend_from_slice(&pot_code.to_be_bytes());
        response(
            crate::frame::STATUS_REQUEST_FRAME_ID,
            long_address,
            short_address,
            *b"IS",
            0,
            &data,
        )
    }
}
