//! Mock hardware for integration tests.
//!
//! `MockRadio` records every byte the controller transmits and re-parses
//! the stream into frames so tests can assert on the full command history.
//! `MockButton` / `MockSounder` stand in for the keypad and alarm GPIOs.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use roomctl::app::ports::RadioLink;
use roomctl::frame::ApiFrameParser;

// ── Decoded outbound frame ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    pub frame_id: u8,
    pub long_address: u64,
    pub short_address: u16,
    pub command: [u8; 2],
    pub parameter: Vec<u8>,
}

impl SentFrame {
    fn decode(frame: &[u8]) -> Self {
        assert_eq!(frame[3], 0x17, "not a remote AT request: {:02X?}", frame);
        let mut long = [0u8; 8];
        long.copy_from_slice(&frame[5..13]);
        Self {
            frame_id: frame[4],
            long_address: u64::from_be_bytes(long),
            short_address: u16::from_be_bytes([frame[13], frame[14]]),
            command: [frame[16], frame[17]],
            parameter: frame[18..frame.len() - 1].to_vec(),
        }
    }

    /// `Some(true)` for a digital-output-high frame on pin `pin`.
    pub fn output_level(&self, pin: u8) -> Option<bool> {
        if self.command != [b'D', pin] {
            return None;
        }
        match self.parameter.as_slice() {
            [0x05] => Some(true),
            [0x04] => Some(false),
            _ => None,
        }
    }

    pub fn is_status_request(&self) -> bool {
        self.command == *b"IS" && self.frame_id == 0x55
    }
}

// ── MockRadio ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockRadio {
    bytes: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every complete frame written so far, decoded.
    pub fn frames(&self) -> Vec<SentFrame> {
        let bytes = self.bytes.lock().unwrap().clone();
        let mut parser = ApiFrameParser::new();
        let mut frames = Vec::new();
        for b in bytes {
            if parser.feed(b).is_some() {
                frames.push(SentFrame::decode(parser.frame()));
            }
        }
        frames
    }

    pub fn raw(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.bytes.lock().unwrap().clear();
    }
}

impl RadioLink for MockRadio {
    type Error = Infallible;

    fn write(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        self.bytes.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

// ── Keypad and sounder ────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockButton {
    pressed: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockButton {
    pub fn set(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::SeqCst);
    }
}

impl ErrorType for MockButton {
    type Error = Infallible;
}

impl InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.pressed.load(Ordering::SeqCst))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pressed.load(Ordering::SeqCst))
    }
}

#[derive(Clone, Default)]
pub struct MockSounder {
    on: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockSounder {
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

impl ErrorType for MockSounder {
    type Error = Infallible;
}

impl OutputPin for MockSounder {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.on.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.on.store(true, Ordering::SeqCst);
        Ok(())
    }
}
