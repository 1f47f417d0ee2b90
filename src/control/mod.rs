//! Per-room decision engines.

pub mod occupancy;
pub mod room;
pub mod threshold;
