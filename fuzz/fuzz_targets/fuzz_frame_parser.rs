//! Fuzz target: `ApiFrameParser::feed`
//!
//! Drives arbitrary byte streams through the resynchronising frame parser
//! and checks every frame it yields is delimited, bounded and
//! checksum-valid.
//!
//! cargo fuzz run fuzz_frame_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomctl::frame::parser::MAX_FRAME_LEN;
use roomctl::frame::{ApiFrameParser, HEADER_LEN, START_DELIMITER, checksum};

fuzz_target!(|data: &[u8]| {
    let mut parser = ApiFrameParser::new();

    for &byte in data {
        if let Some(len) = parser.feed(byte) {
            let frame = parser.frame();
            assert_eq!(frame.len(), len);
            assert!(len <= MAX_FRAME_LEN, "frame exceeds MAX_FRAME_LEN");
            assert_eq!(frame[0], START_DELIMITER);

            let body = &frame[HEADER_LEN..len - 1];
            assert_eq!(usize::from(u16::from_be_bytes([frame[1], frame[2]])), body.len());
            assert_eq!(checksum(body), frame[len - 1], "parser yielded a bad checksum");
        }
    }

    // After a reset the parser must accept bytes cleanly again.
    parser.reset();
    for &byte in data {
        let _ = parser.feed(byte);
    }
});
