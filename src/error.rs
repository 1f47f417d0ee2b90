//! Unified error types for the room controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! worker loops' error handling uniform.  All variants are `Copy` so they
//! can be logged and counted from any thread without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The room registry rejected an operation.
    Registry(RegistryError),
    /// An inbound frame could not be classified or decoded.
    Frame(FrameError),
    /// The radio link failed to accept an outbound frame.
    Radio(RadioError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every slot has been allocated for this session.
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "no free node slot"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Reasons an inbound frame is dropped by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than the fields the dispatcher needs to read.
    Truncated,
    /// Frame type is not a remote AT command response.
    UnsupportedType(u8),
    /// AT command code is not one the dispatcher handles.
    UnsupportedCommand([u8; 2]),
    /// The remote node reported a non-zero AT status.
    CommandStatus(u8),
    /// Sender short address does not resolve to a registered node.
    UnknownNode(u16),
    /// Sample payload is missing a channel the controller depends on.
    MissingChannel,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "frame truncated"),
            Self::UnsupportedType(t) => write!(f, "unsupported frame type 0x{t:02X}"),
            Self::UnsupportedCommand([a, b]) => {
                write!(f, "unsupported AT command {}{}", *a as char, *b as char)
            }
            Self::CommandStatus(s) => write!(f, "remote AT status {s}"),
            Self::UnknownNode(addr) => write!(f, "unknown node 0x{addr:04X}"),
            Self::MissingChannel => write!(f, "sample channel missing"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// UART write returned an error.
    WriteFailed,
    /// UART accepted fewer bytes than the frame length.
    ShortWrite,
    /// Encoded frame would not fit the outbound buffer.
    FrameTooLarge,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "UART write failed"),
            Self::ShortWrite => write!(f, "UART short write"),
            Self::FrameTooLarge => write!(f, "frame too large"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
