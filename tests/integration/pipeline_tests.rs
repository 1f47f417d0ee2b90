//! End-to-end pipeline tests: radio bytes in, actuator frames out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use roomctl::app::service::Controller;
use roomctl::config::ControllerConfig;
use roomctl::dispatch::testing;
use roomctl::frame::ApiFrameParser;
use roomctl::pipeline::workers;
use roomctl::registry::{LightLatch, SlotId, ThermalLatch};

use crate::mock_hw::MockRadio;

const LONG: u64 = 0x0013_A200_4172_79;
const SHORT: u16 = 0xFCC9;

fn setup() -> (Controller<MockRadio, 4>, MockRadio, ApiFrameParser) {
    let radio = MockRadio::new();
    let controller = Controller::new(ControllerConfig::default(), radio.clone());
    (controller, radio, ApiFrameParser::new())
}

fn deliver(c: &Controller<MockRadio, 4>, parser: &mut ApiFrameParser, frame: &[u8]) {
    c.feed_radio_bytes(frame);
    c.run_until_idle(parser);
}

#[test]
fn announce_then_dark_entry_turns_light_on_once() {
    let (c, radio, mut parser) = setup();

    deliver(&c, &mut parser, &testing::announce(LONG, SHORT));
    assert_eq!(c.registry().with(|r| r.lookup_by_short(SHORT)), Some(SlotId::new(0)));
    assert!(radio.frames().is_empty());

    // Vacant first, then presence: 30 % light, 20 °C.
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, false, 377, 597));
    assert!(radio.frames().is_empty());
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 377, 597));

    let frames = radio.frames();
    assert_eq!(frames.len(), 1, "light only: {:?}", frames);
    assert_eq!(frames[0].long_address, LONG);
    assert_eq!(frames[0].short_address, SHORT);
    assert_eq!(frames[0].output_level(b'2'), Some(true));

    // Identical sample: suppressed entirely.
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 377, 597));
    assert_eq!(radio.frames().len(), 1);
}

#[test]
fn identical_samples_emit_exactly_one_command() {
    let (c, radio, mut parser) = setup();
    deliver(&c, &mut parser, &testing::announce(LONG, SHORT));
    for _ in 0..10 {
        deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 377, 597));
    }
    assert_eq!(radio.frames().len(), 1);
    assert_eq!(c.stats().snapshot().commands_sent, 1);
}

#[test]
fn cold_occupied_room_heats_then_vacancy_switches_off() {
    let (c, radio, mut parser) = setup();
    deliver(&c, &mut parser, &testing::announce(LONG, SHORT));

    // Bright room at ~5 °C: 452 * 1200 / 1023 = 530 mV -> 3 °C
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 880, 452));
    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'5'), Some(true));
    assert_eq!(
        c.registry().snapshot(SlotId::new(0)).thermal_latch,
        ThermalLatch::HeaterOn
    );

    radio.clear();
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, false, 880, 452));
    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'5'), Some(false));

    radio.clear();
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, false, 880, 452));
    assert!(radio.frames().is_empty());
}

#[test]
fn hot_room_turning_cold_switches_ac_off_before_heater_on() {
    let (c, radio, mut parser) = setup();
    deliver(&c, &mut parser, &testing::announce(LONG, SHORT));

    // 682 * 1200 / 1023 = 800 mV -> 30 °C
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 880, 682));
    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'6'), Some(true));

    radio.clear();
    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 880, 452));
    let frames = radio.frames();
    assert_eq!(frames.len(), 2, "{:?}", frames);
    assert_eq!(frames[0].output_level(b'6'), Some(false));
    assert_eq!(frames[1].output_level(b'5'), Some(true));
    assert_eq!(
        c.registry().snapshot(SlotId::new(0)).thermal_latch,
        ThermalLatch::HeaterOn
    );
}

#[test]
fn unknown_and_corrupt_frames_never_reach_the_radio() {
    let (c, radio, mut parser) = setup();

    deliver(&c, &mut parser, &testing::sample(LONG, SHORT, true, 377, 597));

    let mut corrupt = testing::announce(LONG, SHORT);
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xFF;
    deliver(&c, &mut parser, &corrupt);

    assert!(radio.frames().is_empty());
    assert_eq!(c.registry().with(|r| r.len()), 0);
    let s = c.stats().snapshot();
    assert_eq!(s.unknown_nodes, 1);
    assert_eq!(s.checksum_failures, 1);
}

#[test]
fn rejoined_node_is_addressed_at_its_new_short_address() {
    let (c, radio, mut parser) = setup();
    deliver(&c, &mut parser, &testing::announce(LONG, SHORT));
    deliver(&c, &mut parser, &testing::announce(LONG, 0x2222));
    assert_eq!(c.registry().with(|r| r.len()), 1);

    deliver(&c, &mut parser, &testing::sample(LONG, 0x2222, true, 377, 597));
    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].short_address, 0x2222);
}

#[test]
fn two_rooms_are_controlled_independently() {
    let (c, radio, mut parser) = setup();
    deliver(&c, &mut parser, &testing::announce(1, 0x0001));
    deliver(&c, &mut parser, &testing::announce(2, 0x0002));

    deliver(&c, &mut parser, &testing::sample(1, 0x0001, true, 377, 597));
    deliver(&c, &mut parser, &testing::sample(2, 0x0002, true, 880, 597));

    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].short_address, 0x0001);
    assert_eq!(
        c.registry().snapshot(SlotId::new(1)).light_latch,
        LightLatch::NoActionYet
    );
}

#[test]
fn threaded_pipeline_delivers_command() {
    let radio = MockRadio::new();
    let controller = Arc::new(Controller::<MockRadio, 4>::new(
        ControllerConfig::default(),
        radio.clone(),
    ));
    workers::spawn_all(&controller).unwrap();

    controller.feed_radio_bytes(&testing::announce(LONG, SHORT));
    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.registry().with(|r| r.is_empty()) {
        assert!(Instant::now() < deadline, "announcement not processed");
        std::thread::sleep(Duration::from_millis(5));
    }

    controller.feed_radio_bytes(&testing::sample(LONG, SHORT, true, 377, 597));
    while radio.frames().is_empty() {
        assert!(Instant::now() < deadline, "no command transmitted");
        std::thread::sleep(Duration::from_millis(5));
    }

    let frames = radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'2'), Some(true));
}
