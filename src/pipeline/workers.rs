//! Worker threads: one blocking receive loop per mailbox.
//!
//! | Thread     | Mailbox     | Priority | Stack |
//! |------------|-------------|----------|-------|
//! | `rx`       | raw bytes   | 10       | 6 KB  |
//! | `action`   | actions     | 8        | 6 KB  |
//! | `room`     | samples     | 6        | 4 KB  |
//! | `threshold`| thresholds  | 6        | 4 KB  |
//!
//! Receive is highest because lost radio bytes cannot be recovered; the
//! action thread outranks the decision threads so queued commands drain
//! before new ones are produced.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::app::ports::RadioLink;
use crate::app::service::Controller;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::Error;
use crate::frame::ApiFrameParser;

use super::take;

pub const RX_PRIORITY: u8 = 10;
pub const ACTION_PRIORITY: u8 = 8;
pub const DECISION_PRIORITY: u8 = 6;

pub fn run_receiver<L: RadioLink, const N: usize>(controller: &Controller<L, N>) -> ! {
    let mut parser = ApiFrameParser::new();
    loop {
        let byte = take(&controller.mailboxes().rx_bytes);
        controller.handle_byte(&mut parser, byte);
    }
}

pub fn run_room_control<L: RadioLink, const N: usize>(controller: &Controller<L, N>) -> ! {
    loop {
        let sample = take(&controller.mailboxes().samples);
        controller.handle_sample(&sample);
    }
}

pub fn run_threshold<L: RadioLink, const N: usize>(controller: &Controller<L, N>) -> ! {
    loop {
        let event = take(&controller.mailboxes().thresholds);
        controller.handle_threshold(&event);
    }
}

pub fn run_action<L: RadioLink, const N: usize>(controller: &Controller<L, N>) -> ! {
    loop {
        let msg = take(&controller.mailboxes().actions);
        controller.handle_action(&msg);
    }
}

/// Spawn the four pipeline threads.
pub fn spawn_all<L, const N: usize>(
    controller: &Arc<Controller<L, N>>,
) -> Result<[JoinHandle<()>; 4], Error>
where
    L: RadioLink + Send + 'static,
{
    let c = Arc::clone(controller);
    let rx = spawn_on_core(Core::App, RX_PRIORITY, 6, "rx\0", move || run_receiver(&c))?;
    let c = Arc::clone(controller);
    let action = spawn_on_core(Core::App, ACTION_PRIORITY, 6, "action\0", move || {
        run_action(&c)
    })?;
    let c = Arc::clone(controller);
    let room = spawn_on_core(Core::App, DECISION_PRIORITY, 4, "room\0", move || {
        run_room_control(&c)
    })?;
    let c = Arc::clone(controller);
    let threshold = spawn_on_core(Core::App, DECISION_PRIORITY, 4, "threshold\0", move || {
        run_threshold(&c)
    })?;
    Ok([rx, action, room, threshold])
}
