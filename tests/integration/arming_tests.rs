//! Keypad arming, countdown broadcast, and intrusion alarm.

use std::sync::Arc;

use roomctl::app::service::Controller;
use roomctl::arming::{ArmingEvent, ArmingPhase};
use roomctl::config::ControllerConfig;
use roomctl::dispatch::testing;
use roomctl::frame::ApiFrameParser;
use roomctl::pipeline::poller::KeypadPoller;
use roomctl::registry::LightLatch;

use crate::mock_hw::{MockButton, MockRadio, MockSounder};

const LONG: u64 = 0x0013_A200_4172_79;
const SHORT: u16 = 0xFCC9;

struct Rig {
    controller: Arc<Controller<MockRadio, 4>>,
    radio: MockRadio,
    buttons: [MockButton; 4],
    sounder: MockSounder,
    poller: KeypadPoller<MockButton, MockSounder, MockRadio, 4>,
    parser: ApiFrameParser,
}

impl Rig {
    fn new() -> Self {
        let config = ControllerConfig {
            arm_countdown_secs: 1,
            ..ControllerConfig::default()
        };
        let radio = MockRadio::new();
        let controller = Arc::new(Controller::new(config, radio.clone()));
        let buttons: [MockButton; 4] = Default::default();
        let sounder = MockSounder::default();
        let poller = KeypadPoller::new(buttons.clone(), sounder.clone(), Arc::clone(&controller));
        Self {
            controller,
            radio,
            buttons,
            sounder,
            poller,
            parser: ApiFrameParser::new(),
        }
    }

    /// Press and release keypad code `code` (1-based), collecting events.
    fn press(&mut self, code: usize) -> Vec<ArmingEvent> {
        let mut events = Vec::new();
        self.buttons[code - 1].set(true);
        for _ in 0..3 {
            events.extend(self.poller.poll());
        }
        self.buttons[code - 1].set(false);
        for _ in 0..8 {
            events.extend(self.poller.poll());
        }
        events
    }

    fn enter_passcode(&mut self) -> Vec<ArmingEvent> {
        [1, 2, 4, 3].into_iter().flat_map(|c| self.press(c)).collect()
    }

    fn idle_until(&mut self, wanted: ArmingEvent) {
        for _ in 0..1000 {
            if self.poller.poll() == Some(wanted) {
                return;
            }
        }
        panic!("{:?} never happened", wanted);
    }

    fn deliver(&mut self, frame: &[u8]) {
        self.controller.feed_radio_bytes(frame);
        self.controller.run_until_idle(&mut self.parser);
    }
}

#[test]
fn arming_broadcasts_all_off_once_and_alarm_fires_once() {
    let mut rig = Rig::new();
    rig.deliver(&testing::announce(LONG, SHORT));
    rig.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    assert_eq!(rig.radio.frames().len(), 1); // light on
    rig.radio.clear();

    assert_eq!(rig.enter_passcode(), vec![ArmingEvent::Armed]);
    assert_eq!(rig.controller.arming().phase(), ArmingPhase::Countdown);

    rig.idle_until(ArmingEvent::Activated);
    assert!(rig.controller.arming().is_active());

    // Exactly one all-off: three Off frames to the one node.
    rig.controller.run_until_idle(&mut rig.parser);
    for _ in 0..20 {
        rig.poller.poll();
    }
    rig.controller.run_until_idle(&mut rig.parser);
    let frames = rig.radio.frames();
    assert_eq!(frames.len(), 3, "{:?}", frames);
    assert!(frames.iter().all(|f| f.short_address == SHORT));
    assert_eq!(frames[0].output_level(b'2'), Some(false));
    assert_eq!(frames[1].output_level(b'5'), Some(false));
    assert_eq!(frames[2].output_level(b'6'), Some(false));
    rig.radio.clear();

    // Presence while active: alarm, no comfort command.
    rig.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    assert!(rig.radio.frames().is_empty());
    rig.poller.poll();
    assert!(rig.sounder.is_on());
    assert!(rig.poller.alarm_on());

    // Repeated presence does not re-trigger anything.
    rig.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    assert!(rig.radio.frames().is_empty());
}

#[test]
fn disarm_clears_alarm_and_resumes_control() {
    let mut rig = Rig::new();
    rig.deliver(&testing::announce(LONG, SHORT));

    rig.enter_passcode();
    rig.idle_until(ArmingEvent::Activated);
    rig.controller.run_until_idle(&mut rig.parser);
    rig.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    rig.poller.poll();
    assert!(rig.sounder.is_on());
    rig.radio.clear();

    assert_eq!(rig.enter_passcode(), vec![ArmingEvent::Disarmed]);
    let arming = rig.controller.arming();
    assert_eq!(arming.phase(), ArmingPhase::Disarmed);
    assert_eq!(arming.countdown_remaining(), 0);
    assert!(!arming.alarm_raised());
    assert!(!rig.sounder.is_on());

    // Latch was reset by the broadcast, so the dark occupied room lights again.
    assert_eq!(
        rig.controller
            .registry()
            .snapshot(roomctl::registry::SlotId::new(0))
            .light_latch,
        LightLatch::OffSent
    );
    rig.deliver(&testing::sample(LONG, SHORT, true, 377, 597));
    let frames = rig.radio.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].output_level(b'2'), Some(true));
}

#[test]
fn wrong_or_slow_passcode_never_arms() {
    let mut rig = Rig::new();
    for code in [1, 2, 3, 4] {
        assert!(rig.press(code).is_empty());
    }
    rig.press(1);
    rig.press(2);
    // 3 s entry timeout at 20 ms polls
    for _ in 0..200 {
        rig.poller.poll();
    }
    rig.press(4);
    assert!(rig.press(3).is_empty());
    assert_eq!(rig.controller.arming().phase(), ArmingPhase::Disarmed);
}
