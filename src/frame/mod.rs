//! XBee API frame layout (API mode 1, unescaped).
//!
//! ```text
//! ┌──────┬──────────┬─────────────────────────────┬──────────┐
//! │ 0x7E │ Len (2B) │ Frame data (Len bytes)      │ Checksum │
//! │      │ BE u16   │ type · id · addr · cmd · …  │ 1 B      │
//! └──────┴──────────┴─────────────────────────────┴──────────┘
//! ```
//!
//! The checksum is `0xFF` minus the low byte of the sum of the frame data,
//! so a frame is valid when its data bytes plus the checksum sum to `0xFF`.

pub mod encoder;
pub mod io_sample;
pub mod parser;

pub use encoder::{CommandEncoder, FrameBuf, RemoteAtRequest};
pub use io_sample::IoSample;
pub use parser::ApiFrameParser;

pub const START_DELIMITER: u8 = 0x7E;

/// Delimiter plus the two length bytes.
pub const HEADER_LEN: usize = 3;

pub const FRAME_TYPE_REMOTE_AT_REQUEST: u8 = 0x17;
pub const FRAME_TYPE_REMOTE_AT_RESPONSE: u8 = 0x97;

/// Frame id used for actuator and provisioning requests.
pub const COMMAND_FRAME_ID: u8 = 0x01;
/// Frame id reserved for status requests; echoed back in the response.
pub const STATUS_REQUEST_FRAME_ID: u8 = 0x55;

/// Remote AT option: apply the change immediately.
pub const OPT_APPLY_CHANGES: u8 = 0x02;

pub const BROADCAST_LONG_ADDRESS: u64 = 0x0000_0000_0000_FFFF;
pub const BROADCAST_SHORT_ADDRESS: u16 = 0xFFFE;

// ── AT commands ───────────────────────────────────────────────

pub const AT_NETWORK_ADDRESS: [u8; 2] = *b"MY";
pub const AT_IO_SAMPLE: [u8; 2] = *b"IS";
pub const AT_CHANGE_DETECT: [u8; 2] = *b"IC";
pub const AT_SAMPLE_RATE: [u8; 2] = *b"IR";

/// `Dn` command for digital/analog line `n` (0–9).
pub const fn at_dio(line: u8) -> [u8; 2] {
    [b'D', b'0' + line]
}

// ── DIO line modes ────────────────────────────────────────────

pub const DIO_MODE_ANALOG: u8 = 0x02;
pub const DIO_MODE_DIGITAL_IN: u8 = 0x03;
pub const DIO_MODE_OUTPUT_LOW: u8 = 0x04;
pub const DIO_MODE_OUTPUT_HIGH: u8 = 0x05;

/// Byte offsets into a complete remote AT response frame.
pub mod offsets {
    pub const FRAME_TYPE: usize = 3;
    pub const FRAME_ID: usize = 4;
    pub const LONG_ADDRESS: usize = 5;
    pub const SHORT_ADDRESS: usize = 13;
    pub const AT_COMMAND: usize = 15;
    pub const STATUS: usize = 17;
    /// Start of the command data (address for `MY`, samples for `IS`).
    pub const DATA: usize = 18;
}

/// Checksum over frame data (everything between the length and checksum).
pub fn checksum(data: &[u8]) -> u8 {
    0xFF_u8.wrapping_sub(data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)))
}

pub(crate) fn read_u16_be(frame: &[u8], at: usize) -> Option<u16> {
    let bytes = frame.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u64_be(frame: &[u8], at: usize) -> Option<u64> {
    let bytes = frame.get(at..at + 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Some(u64::from_be_bytes(raw))
}
