//! Mailbox pipeline between the radio and the decision engines.
//!
//! ```text
//!  UART ──bytes──▶ ┌─────────┐ ─Sample──────▶ ┌──────────┐
//!                  │ receive │                │ room ctl │ ─┐
//!                  │ (parse, │ ─Threshold───▶ ┌──────────┐  │ ActionMsg  ┌────────┐
//!                  │dispatch)│                │threshold │ ─┼──────────▶ │ action │──▶ RadioLink
//!                  └─────────┘                └──────────┘  │            └────────┘
//!  poll timer (arming) ─────────── AllOff ─────────────────┘
//! ```
//!
//! Every mailbox is a bounded `embassy-sync` channel; worker threads block
//! on `receive()` through `futures_lite::future::block_on`.  FIFO holds
//! within one mailbox only.

pub mod poller;
pub mod transmit;
pub mod workers;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, with_timeout};
use futures_lite::future::block_on;

use crate::app::messages::{ActionMsg, Sample, ThresholdEvent};

/// Bounded MPMC mailbox.
pub type Mailbox<T, const DEPTH: usize> = Channel<CriticalSectionRawMutex, T, DEPTH>;

/// Raw radio bytes awaiting the frame parser.
pub const RX_BYTES_DEPTH: usize = 128;
pub const SAMPLE_DEPTH: usize = 16;
pub const THRESHOLD_DEPTH: usize = 8;
pub const ACTION_DEPTH: usize = 16;

/// The four mailboxes of one controller.
pub struct Mailboxes {
    pub rx_bytes: Mailbox<u8, RX_BYTES_DEPTH>,
    pub samples: Mailbox<Sample, SAMPLE_DEPTH>,
    pub thresholds: Mailbox<ThresholdEvent, THRESHOLD_DEPTH>,
    pub actions: Mailbox<ActionMsg, ACTION_DEPTH>,
}

impl Default for Mailboxes {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailboxes {
    pub const fn new() -> Self {
        Self {
            rx_bytes: Channel::new(),
            samples: Channel::new(),
            thresholds: Channel::new(),
            actions: Channel::new(),
        }
    }

    /// True when no mailbox holds a message.
    pub fn is_idle(&self) -> bool {
        self.rx_bytes.is_empty()
            && self.samples.is_empty()
            && self.thresholds.is_empty()
            && self.actions.is_empty()
    }
}

/// Blocking send honouring the wait policy.
///
/// `None` waits as long as it takes; otherwise the message is dropped after
/// `wait` and `false` is returned.
pub fn post<T, const DEPTH: usize>(
    mailbox: &Mailbox<T, DEPTH>,
    msg: T,
    wait: Option<Duration>,
) -> bool {
    match wait {
        None => {
            block_on(mailbox.send(msg));
            true
        }
        Some(limit) => block_on(with_timeout(limit, mailbox.send(msg))).is_ok(),
    }
}

/// Block until `mailbox` yields a message.
pub fn take<T, const DEPTH: usize>(mailbox: &Mailbox<T, DEPTH>) -> T {
    block_on(mailbox.receive())
}
