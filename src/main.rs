//! Roomctl Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │   UartLink (RadioLink)   uart-rx reader   keypad / sounder     │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            Controller (pure logic)                     │    │
//! │  │  Dispatcher · Registry · Room · Threshold · Encoder    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │  Worker threads (rx · action · room · threshold) · poll timer  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use roomctl::adapters::uart::{UartLink, spawn_reader};
use roomctl::app::service::Controller;
use roomctl::config::ControllerConfig;
use roomctl::drivers::hw_timer;
use roomctl::pipeline::poller::KeypadPoller;
use roomctl::pipeline::workers;

const STATS_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Roomctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (board override or defaults) ────────────────
    let config = ControllerConfig::load(option_env!("ROOMCTL_CONFIG_JSON"));
    let poll_period_ms = config.poll_period_ms;

    // ── 3. Radio UART (pins::XBEE_UART_TX_GPIO / RX_GPIO) ─────
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(config.uart_baud)),
    )?;
    let (tx, rx) = uart.into_split();

    // ── 4. Controller + pipeline threads ──────────────────────
    let controller: Arc<Controller<UartLink>> =
        Arc::new(Controller::new(config, UartLink::new(tx)));
    spawn_reader(rx, Arc::clone(&controller))?;
    workers::spawn_all(&controller)?;

    // ── 5. Keypad + sounder (pins::KEYPAD_GPIOS / ALARM_GPIO) ─
    let mut buttons = [
        PinDriver::input(pins.gpio4.downgrade())?,
        PinDriver::input(pins.gpio5.downgrade())?,
        PinDriver::input(pins.gpio6.downgrade())?,
        PinDriver::input(pins.gpio7.downgrade())?,
    ];
    for button in &mut buttons {
        button.set_pull(Pull::Up)?;
    }
    let alarm = PinDriver::output(pins.gpio10.downgrade_output())?;

    let mut poller = KeypadPoller::new(buttons, alarm, Arc::clone(&controller));
    let _poll_timer = hw_timer::start_poll_timer(poll_period_ms, move || {
        if let Some(event) = poller.poll() {
            info!("arming: {:?}", event);
        }
    })?;

    // ── 6. Provision the network ──────────────────────────────
    if let Err(e) = controller.provision_network() {
        warn!("provisioning incomplete: {}", e);
    }

    // ── 7. Idle: periodic diagnostics ─────────────────────────
    loop {
        std::thread::sleep(STATS_INTERVAL);
        controller.stats().log_summary();
    }
}
