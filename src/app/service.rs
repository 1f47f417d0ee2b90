//! Controller service: the hexagonal core.
//!
//! [`Controller`] owns every piece of shared state: the room registry, the
//! arming flags, the mailboxes, the transmit path and the counters.  Each
//! pipeline stage is a plain method (`handle_frame`, `handle_sample`, …) so
//! worker threads and tests drive the same code; the threads in
//! [`pipeline::workers`](crate::pipeline::workers) only add the blocking
//! receive loops around them.
//!
//! ```text
//!  feed_radio_bytes ──▶ handle_frame ──▶ handle_sample ────▶ handle_action ──▶ RadioLink
//!                                    └─▶ handle_threshold ─┘
//! ```

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use crate::arming::ArmingState;
use crate::config::ControllerConfig;
use crate::control::room::RoomControlEngine;
use crate::control::threshold::ThresholdEngine;
use crate::diagnostics::PipelineStats;
use crate::dispatch::{Dispatch, FrameDispatcher};
use crate::error::{Error, FrameError, RadioError};
use crate::frame::encoder::provisioning_frames;
use crate::frame::{ApiFrameParser, CommandEncoder};
use crate::pipeline::transmit::Transmitter;
use crate::pipeline::{Mailboxes, post};
use crate::registry::{
    DEFAULT_CAPACITY, LightLatch, Registry, RoomDefaults, SharedRegistry, ThermalLatch,
};

use super::messages::{ActionMsg, ActuatorCommand, Decision, Sample, ThresholdEvent};
use super::ports::RadioLink;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<L: RadioLink, const N: usize = DEFAULT_CAPACITY> {
    config: ControllerConfig,
    registry: SharedRegistry<N>,
    arming: ArmingState,
    mailboxes: Mailboxes,
    transmitter: Transmitter<L>,
    stats: PipelineStats,
    dispatcher: FrameDispatcher,
    room: RoomControlEngine,
    threshold: ThresholdEngine,
    encoder: CommandEncoder,
    send_wait: Option<Duration>,
}

impl<L: RadioLink, const N: usize> Controller<L, N> {
    pub fn new(config: ControllerConfig, link: L) -> Self {
        let registry = SharedRegistry::new(Registry::new(RoomDefaults::from_config(&config)));
        let transmitter = Transmitter::new(
            link,
            Duration::from_millis(u64::from(config.tx_lock_warn_ms.max(1))),
        );
        Self {
            registry,
            arming: ArmingState::new(),
            mailboxes: Mailboxes::new(),
            transmitter,
            stats: PipelineStats::new(),
            dispatcher: FrameDispatcher::new(config.scaling),
            room: RoomControlEngine::new(config.scaling),
            threshold: ThresholdEngine::new(config.heat_band_margin_c),
            encoder: CommandEncoder::new(config.actuator_pins),
            send_wait: config
                .mailbox_send_timeout_ms
                .map(|ms| Duration::from_millis(u64::from(ms))),
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedRegistry<N> {
        &self.registry
    }

    pub fn arming(&self) -> &ArmingState {
        &self.arming
    }

    pub fn mailboxes(&self) -> &Mailboxes {
        &self.mailboxes
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn transmitter(&self) -> &Transmitter<L> {
        &self.transmitter
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Queue raw radio bytes for the receive stage without blocking.
    ///
    /// Returns the number of bytes accepted; the rest are counted as
    /// overflow.
    pub fn feed_radio_bytes(&self, data: &[u8]) -> usize {
        let mut accepted = 0;
        for &byte in data {
            if self.mailboxes.rx_bytes.try_send(byte).is_err() {
                PipelineStats::add(&self.stats.rx_overflow, (data.len() - accepted) as u32);
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Run `byte` through `parser`, dispatching any frame it completes.
    pub fn handle_byte(&self, parser: &mut ApiFrameParser, byte: u8) {
        let failures = parser.checksum_failures();
        let complete = parser.feed(byte);
        if parser.checksum_failures() != failures {
            PipelineStats::bump(&self.stats.checksum_failures);
        }
        if complete.is_some() {
            self.handle_frame(parser.frame());
        }
    }

    /// Classify one complete frame and publish the result.
    pub fn handle_frame(&self, frame: &[u8]) {
        PipelineStats::bump(&self.stats.frames_received);
        let now_ms = Instant::now().as_millis();
        match self.dispatcher.dispatch(&self.registry, frame, now_ms) {
            Ok(Dispatch::Sample(sample)) => {
                if !post(&self.mailboxes.samples, sample, self.send_wait) {
                    self.mailbox_timeout("sample");
                }
            }
            Ok(Dispatch::Threshold(event)) => {
                if !post(&self.mailboxes.thresholds, event, self.send_wait) {
                    self.mailbox_timeout("threshold");
                }
            }
            Ok(Dispatch::Registered(_) | Dispatch::Relearned(_) | Dispatch::Ignored) => {}
            Err(Error::Frame(FrameError::UnknownNode(addr))) => {
                PipelineStats::bump(&self.stats.unknown_nodes);
                warn!("frame from unregistered node 0x{:04X} dropped", addr);
            }
            Err(Error::Registry(e)) => {
                PipelineStats::bump(&self.stats.registry_full);
                warn!("announcement dropped: {}", e);
            }
            Err(e) => {
                PipelineStats::bump(&self.stats.dropped_frames);
                debug!("frame dropped: {}", e);
            }
        }
    }

    // ── Decision stages ───────────────────────────────────────

    pub fn handle_sample(&self, sample: &Sample) {
        let outcome = self
            .registry
            .with_record_mut(sample.node, |record| {
                self.room.process(record, sample, &self.arming)
            });
        outcome.log();
        if let Some(command) = outcome.command() {
            self.publish_action(ActionMsg::Command(command));
        }
    }

    pub fn handle_threshold(&self, event: &ThresholdEvent) {
        let outcome = self
            .registry
            .with_record_mut(event.node, |record| self.threshold.handle(record, event.input));
        outcome.log();
        if let Some(command) = outcome.command() {
            self.publish_action(ActionMsg::Command(command));
        }
    }

    fn publish_action(&self, msg: ActionMsg) {
        if !post(&self.mailboxes.actions, msg, self.send_wait) {
            self.mailbox_timeout("action");
        }
    }

    fn mailbox_timeout(&self, mailbox: &str) {
        PipelineStats::bump(&self.stats.mailbox_timeouts);
        warn!("{} mailbox full past wait limit, message dropped", mailbox);
    }

    /// Queue the all-off broadcast without blocking.  Returns `false` if
    /// the action mailbox is full.
    pub fn request_all_off(&self) -> bool {
        self.mailboxes.actions.try_send(ActionMsg::AllOff).is_ok()
    }

    // ── Transmit stage ────────────────────────────────────────

    pub fn handle_action(&self, msg: &ActionMsg) {
        match msg {
            ActionMsg::Command(command) => {
                if let Err(e) = self.send_command(command) {
                    warn!("command to slot {} failed: {}", command.node.slot.index(), e);
                }
            }
            ActionMsg::AllOff => self.broadcast_all_off(),
        }
    }

    fn send_command(&self, command: &ActuatorCommand) -> Result<(), RadioError> {
        if command.is_noop() {
            return Ok(());
        }
        let frames = self.encoder.encode(command)?;
        let result = self.transmitter.transmit(&frames, &self.stats);
        match result {
            Ok(()) => PipelineStats::bump(&self.stats.commands_sent),
            Err(_) => PipelineStats::bump(&self.stats.tx_failures),
        }
        result
    }

    fn broadcast_all_off(&self) {
        // Latches first, then transmit outside the registry lock.
        let nodes = self.registry.with_mut(|registry| {
            for record in registry.iter_mut() {
                record.light_latch = LightLatch::OffSent;
                record.thermal_latch = ThermalLatch::Neither;
            }
            registry.node_refs()
        });
        info!("all-off broadcast to {} node(s)", nodes.len());
        for node in &nodes {
            let command = ActuatorCommand::set(*node, Decision::Off, Decision::Off, Decision::Off);
            if let Err(e) = self.send_command(&command) {
                warn!("all-off to slot {} failed: {}", node.slot.index(), e);
            }
        }
    }

    // ── Start-up ──────────────────────────────────────────────

    /// Broadcast the node configuration sequence, pausing
    /// `provisioning_settle_ms` after each frame.
    pub fn provision_network(&self) -> Result<(), Error> {
        let settle = std::time::Duration::from_millis(u64::from(self.config.provisioning_settle_ms));
        for frame in provisioning_frames(&self.config)? {
            self.transmitter
                .transmit(core::slice::from_ref(&frame), &self.stats)?;
            if !settle.is_zero() {
                std::thread::sleep(settle);
            }
        }
        info!("network provisioning sequence sent");
        Ok(())
    }

    // ── Synchronous draining (tests, single-threaded hosts) ───

    /// Process queued messages stage by stage until every mailbox is empty.
    /// Returns the number of messages handled.
    pub fn run_until_idle(&self, parser: &mut ApiFrameParser) -> usize {
        let mut handled = 0;
        loop {
            let mut progressed = false;
            while let Ok(byte) = self.mailboxes.rx_bytes.try_receive() {
                self.handle_byte(parser, byte);
                handled += 1;
                progressed = true;
            }
            while let Ok(sample) = self.mailboxes.samples.try_receive() {
                self.handle_sample(&sample);
                handled += 1;
                progressed = true;
            }
            while let Ok(event) = self.mailboxes.thresholds.try_receive() {
                self.handle_threshold(&event);
                handled += 1;
                progressed = true;
            }
            while let Ok(msg) = self.mailboxes.actions.try_receive() {
                self.handle_action(&msg);
                handled += 1;
                progressed = true;
            }
            if !progressed {
                return handled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::NullLink;
    use crate::dispatch::testing;
    use crate::registry::SlotId;

    const LONG: u64 = 0x0013_A200_4172_79;
    const SHORT: u16 = 0xFCC9;

    fn controller() -> Controller<NullLink, 4> {
        Controller::new(ControllerConfig::default(), NullLink)
    }

    #[test]
    fn frame_bytes_flow_to_command() {
        let c = controller();
        let mut parser = ApiFrameParser::new();
        c.feed_radio_bytes(&testing::announce(LONG, SHORT));
        c.run_until_idle(&mut parser);
        c.feed_radio_bytes(&testing::sample(LONG, SHORT, true, 377, 597));
        c.run_until_idle(&mut parser);

        let s = c.stats().snapshot();
        assert_eq!(s.frames_received, 2);
        assert_eq!(s.commands_sent, 1);
        assert_eq!(s.frames_sent, 1);
        assert_eq!(
            c.registry().snapshot(SlotId::new(0)).light_latch,
            LightLatch::OnSent
        );
    }

    #[test]
    fn unknown_sender_is_counted() {
        let c = controller();
        c.handle_frame(&testing::sample(LONG, SHORT, true, 377, 597));
        assert_eq!(c.stats().snapshot().unknown_nodes, 1);
        assert!(c.mailboxes().is_idle());
    }

    #[test]
    fn rx_overflow_is_counted() {
        let c = controller();
        let burst = [0u8; 200];
        assert_eq!(c.feed_radio_bytes(&burst), crate::pipeline::RX_BYTES_DEPTH);
        assert_eq!(c.stats().snapshot().rx_overflow, 72);
    }

    #[test]
    fn all_off_resets_latches() {
        let c = controller();
        c.handle_frame(&testing::announce(LONG, SHORT));
        c.registry().with_record_mut(SlotId::new(0), |r| {
            r.light_latch = LightLatch::OnSent;
            r.thermal_latch = ThermalLatch::AcOn;
        });
        assert!(c.request_all_off());
        c.run_until_idle(&mut ApiFrameParser::new());
        let r = c.registry().snapshot(SlotId::new(0));
        assert_eq!(r.light_latch, LightLatch::OffSent);
        assert_eq!(r.thermal_latch, ThermalLatch::Neither);
        assert_eq!(c.stats().snapshot().frames_sent, 3);
    }

    #[test]
    fn provisioning_sends_every_frame() {
        let config = ControllerConfig {
            provisioning_settle_ms: 0,
            ..ControllerConfig::default()
        };
        let c: Controller<NullLink, 4> = Controller::new(config, NullLink);
        c.provision_network().unwrap();
        assert_eq!(c.stats().snapshot().frames_sent, 8);
    }
}
