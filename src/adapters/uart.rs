//! XBee UART adapter (ESP-IDF).
//!
//! The UART driver is split: the TX half implements [`RadioLink`] behind
//! the transmit lock, the RX half is drained by a dedicated reader thread
//! that pushes bytes into the receive mailbox.

use std::sync::Arc;

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::uart::{UartRxDriver, UartTxDriver};
use esp_idf_sys::EspError;
use log::warn;

use crate::app::ports::RadioLink;
use crate::app::service::Controller;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::Error;

/// Outbound half of the coordinator UART.
pub struct UartLink {
    tx: UartTxDriver<'static>,
}

impl UartLink {
    pub fn new(tx: UartTxDriver<'static>) -> Self {
        Self { tx }
    }
}

impl RadioLink for UartLink {
    type Error = EspError;

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.tx.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.tx.wait_done(BLOCK)
    }
}

/// Reader priority: above every pipeline worker.
const READER_PRIORITY: u8 = 12;

/// Spawn the thread that moves UART bytes into the receive mailbox.
pub fn spawn_reader<const N: usize>(
    mut rx: UartRxDriver<'static>,
    controller: Arc<Controller<UartLink, N>>,
) -> Result<std::thread::JoinHandle<()>, Error> {
    spawn_on_core(Core::Pro, READER_PRIORITY, 4, "uart-rx\0", move || {
        let mut buf = [0u8; 64];
        loop {
            match rx.read(&mut buf, BLOCK) {
                Ok(0) => {}
                Ok(n) => {
                    controller.feed_radio_bytes(&buf[..n]);
                }
                Err(e) => warn!("uart read failed: {}", e),
            }
        }
    })
}
