//! Streaming API frame parser.
//!
//! Bytes arrive one at a time from the receive mailbox.  The parser hunts
//! for the start delimiter, reads the big-endian length, accumulates the
//! frame data while summing it, and accepts the frame only if the trailing
//! checksum brings the sum to `0xFF`.  Any failure drops back to delimiter
//! hunting, so a corrupted or truncated frame costs at most one frame.

use log::debug;

use super::{HEADER_LEN, START_DELIMITER};

/// Largest complete frame (header, data, checksum) accepted.
pub const MAX_FRAME_LEN: usize = 128;

/// Parser state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Discarding bytes until a start delimiter.
    Delimiter,
    LengthHigh,
    LengthLow { high: u8 },
    /// Reading frame data.
    Data { expected: usize, collected: usize },
    Checksum { expected: usize },
}

pub struct ApiFrameParser {
    state: ParserState,
    buf: [u8; MAX_FRAME_LEN],
    sum: u8,
    frame_len: usize,
    checksum_failures: u32,
}

impl Default for ApiFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiFrameParser {
    pub const fn new() -> Self {
        Self {
            state: ParserState::Delimiter,
            buf: [0; MAX_FRAME_LEN],
            sum: 0,
            frame_len: 0,
            checksum_failures: 0,
        }
    }

    /// Feed one byte.
    ///
    /// Returns the total length of a complete, checksum-valid frame once its
    /// final byte arrives; the frame can then be copied out with
    /// [`fetch_frame`](Self::fetch_frame) until the next byte is fed.
    pub fn feed(&mut self, byte: u8) -> Option<usize> {
        match self.state {
            ParserState::Delimiter => {
                if byte == START_DELIMITER {
                    self.buf[0] = byte;
                    self.state = ParserState::LengthHigh;
                }
                None
            }

            ParserState::LengthHigh => {
                self.buf[1] = byte;
                self.state = ParserState::LengthLow { high: byte };
                None
            }

            ParserState::LengthLow { high } => {
                self.buf[2] = byte;
                let expected = usize::from(u16::from_be_bytes([high, byte]));
                if expected == 0 || HEADER_LEN + expected + 1 > MAX_FRAME_LEN {
                    debug!("frame length {} rejected, resyncing", expected);
                    self.state = ParserState::Delimiter;
                    return None;
                }
                self.sum = 0;
                self.state = ParserState::Data {
                    expected,
                    collected: 0,
                };
                None
            }

            ParserState::Data {
                expected,
                collected,
            } => {
                self.buf[HEADER_LEN + collected] = byte;
                self.sum = self.sum.wrapping_add(byte);
                let collected = collected + 1;
                self.state = if collected == expected {
                    ParserState::Checksum { expected }
                } else {
                    ParserState::Data {
                        expected,
                        collected,
                    }
                };
                None
            }

            ParserState::Checksum { expected } => {
                self.state = ParserState::Delimiter;
                if self.sum.wrapping_add(byte) != 0xFF {
                    self.checksum_failures = self.checksum_failures.wrapping_add(1);
                    debug!("checksum mismatch, frame dropped");
                    return None;
                }
                self.buf[HEADER_LEN + expected] = byte;
                self.frame_len = HEADER_LEN + expected + 1;
                Some(self.frame_len)
            }
        }
    }

    /// Copy the most recently completed frame into `out`.
    ///
    /// Returns the number of bytes copied (truncated to `out.len()`).
    pub fn fetch_frame(&self, out: &mut [u8]) -> usize {
        let n = self.frame_len.min(out.len());
        out[..n].copy_from_slice(&self.buf[..n]);
        n
    }

    /// The most recently completed frame.
    pub fn frame(&self) -> &[u8] {
        &self.buf[..self.frame_len]
    }

    /// Frames dropped for a bad checksum since construction.
    pub fn checksum_failures(&self) -> u32 {
        self.checksum_failures
    }

    /// Abandon any partial frame.
    pub fn reset(&mut self) {
        self.state = ParserState::Delimiter;
        self.frame_len = 0;
    }
}
