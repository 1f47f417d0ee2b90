//! Application core.
//!
//! The controller service and the messages its pipeline stages exchange.
//! The only outbound I/O goes through the [`ports::RadioLink`] trait, so
//! the whole core runs on the host against a mock radio.

pub mod messages;
pub mod ports;
pub mod service;
