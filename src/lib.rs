//! Roomctl coordinator firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All ESP-IDF
//! specific code is guarded by `#[cfg(target_os = "espidf")]` within each
//! module.

#![deny(unused_must_use)]

pub mod app;
pub mod arming;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod pins;
pub mod pipeline;
pub mod registry;

pub mod adapters;
pub mod drivers;
