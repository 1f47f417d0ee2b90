//! Port traits: the boundary between the controller and the radio.
//!
//! ```text
//!   Transmitter ──▶ RadioLink ──▶ UART / mock
//! ```
//!
//! The transmit path is generic over [`RadioLink`], so the whole pipeline
//! runs on the host against a recording mock.  The inbound direction needs
//! no trait: whatever owns the UART pushes bytes into the receive mailbox.

// ───────────────────────────────────────────────────────────────
// Radio link (driven adapter: domain → coordinator radio)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented outbound channel to the coordinator radio.
pub trait RadioLink {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Write `data`; returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until buffered output has left the UART.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A link that accepts and discards every frame.
pub struct NullLink;

impl RadioLink for NullLink {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
