//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter | Implements | Connects to                  |
//! |---------|------------|------------------------------|
//! | `uart`  | RadioLink  | XBee coordinator on UART1    |
//! |         | (reader)   | receive mailbox              |

#[cfg(target_os = "espidf")]
pub mod uart;
