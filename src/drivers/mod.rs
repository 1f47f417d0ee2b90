//! Coordinator-board drivers and threading helpers.

pub mod alarm;
pub mod hw_timer;
pub mod keypad;
pub mod task_pin;
