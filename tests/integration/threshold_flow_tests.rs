//! Threshold button → status poll → potentiometer action, over the wire.

use roomctl::app::service::Controller;
use roomctl::config::ControllerConfig;
use roomctl::dispatch::testing;
use roomctl::frame::ApiFrameParser;
use roomctl::registry::{Selector, SlotId};

use crate::mock_hw::MockRadio;

const LONG: u64 = 0x0013_A200_4172_79;
const SHORT: u16 = 0xFCC9;

/// ADC code whose percentage (`code * 100 / 1023`) is `percent`.
fn pot_code(percent: u16) -> u16 {
    (percent * 1023).div_ceil(100)
}

struct Node {
    controller: Controller<MockRadio, 4>,
    radio: MockRadio,
    parser: ApiFrameParser,
}

impl Node {
    fn joined() -> Self {
        let radio = MockRadio::new();
        let mut node = Self {
            controller: Controller::new(ControllerConfig::default(), radio.clone()),
            radio,
            parser: ApiFrameParser::new(),
        };
        node.deliver(&testing::announce(LONG, SHORT));
        node
    }

    fn deliver(&mut self, frame: &[u8]) {
        self.controller.feed_radio_bytes(frame);
        self.controller.run_until_idle(&mut self.parser);
    }

    fn turn_pot(&mut self, percent: u16) {
        self.deliver(&testing::pot(LONG, SHORT, pot_code(percent)));
    }
}

#[test]
fn pot_code_helper_matches_scaling() {
    let scaling = ControllerConfig::default().scaling;
    for percent in [0, 9, 30, 40, 100] {
        assert_eq!(u16::from(scaling.pot_percent(pot_code(percent))), percent);
    }
}

#[test]
fn button_press_polls_node_status() {
    let mut n = Node::joined();
    n.deliver(&testing::button(LONG, SHORT, true));

    let frames = n.radio.frames();
    assert_eq!(frames.len(), 1);
    assert!(frames[0].is_status_request());
    assert_eq!(frames[0].short_address, SHORT);
    assert!(frames[0].parameter.is_empty());

    // Release report is ignored.
    n.deliver(&testing::button(LONG, SHORT, false));
    assert_eq!(n.radio.frames().len(), 1);
}

#[test]
fn mid_band_toggles_light_override() {
    let mut n = Node::joined();
    n.turn_pot(40);
    n.turn_pot(40);

    let frames = n.radio.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].output_level(b'2'), Some(true));
    assert_eq!(frames[1].output_level(b'2'), Some(false));
    assert!(!n.controller.registry().snapshot(SlotId::new(0)).light_override);
}

#[test]
fn light_override_suppresses_automatic_light() {
    let mut n = Node::joined();
    n.turn_pot(40);
    n.radio.clear();

    // Bright and vacant would normally leave the light alone; either way
    // the overridden channel must not be touched.
    n.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    n.deliver(&testing::sample(LONG, SHORT, false, 880, 597));
    assert!(n.radio.frames().iter().all(|f| f.output_level(b'2').is_none()));
}

#[test]
fn edit_heating_threshold_pushes_upper_bound() {
    let mut n = Node::joined();
    n.turn_pot(100); // Light -> Heating
    n.turn_pot(9); // arm edit
    n.turn_pot(30); // commit

    let record = n.controller.registry().snapshot(SlotId::new(0));
    assert_eq!(record.edit.selector, Selector::Heating);
    assert!(!record.edit.edit_armed);
    assert_eq!(record.lower_heat_threshold, 30);
    assert_eq!(record.upper_heat_threshold, 32);
    assert!(n.radio.frames().is_empty());

    // 20 °C is now below the band: the heater comes on.
    n.deliver(&testing::sample(LONG, SHORT, true, 880, 597));
    let frames = n.radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'5'), Some(true));
}

#[test]
fn heating_override_switches_ac_off_before_heater_on() {
    let mut n = Node::joined();
    n.turn_pot(100);
    n.turn_pot(40);

    let frames = n.radio.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].output_level(b'6'), Some(false));
    assert_eq!(frames[1].output_level(b'5'), Some(true));
}

#[test]
fn pot_from_unknown_node_is_dropped() {
    let mut n = Node::joined();
    n.deliver(&testing::pot(0x99, 0x0BAD, pot_code(40)));
    assert!(n.radio.frames().is_empty());
    assert_eq!(n.controller.stats().snapshot().unknown_nodes, 1);
}
