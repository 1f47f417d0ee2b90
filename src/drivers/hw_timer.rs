//! Periodic keypad poll timer.
//!
//! On ESP-IDF the callback runs in the `esp_timer` task (not an ISR) through
//! the safe `EspTaskTimerService` wrapper.  On host targets a plain thread
//! sleeps between calls.  In both cases the callback must not block.

use crate::error::Error;

/// Keeps the timer running until dropped.
pub struct PollTimer {
    #[cfg(target_os = "espidf")]
    _timer: esp_idf_svc::timer::EspTimer<'static>,
    #[cfg(not(target_os = "espidf"))]
    _thread: std::thread::JoinHandle<()>,
}

#[cfg(target_os = "espidf")]
pub fn start_poll_timer(
    period_ms: u32,
    callback: impl FnMut() + Send + 'static,
) -> Result<PollTimer, Error> {
    use esp_idf_svc::timer::EspTaskTimerService;

    let service =
        EspTaskTimerService::new().map_err(|_| Error::Init("timer service unavailable"))?;
    let timer = service
        .timer(callback)
        .map_err(|_| Error::Init("poll timer create failed"))?;
    timer
        .every(core::time::Duration::from_millis(u64::from(period_ms)))
        .map_err(|_| Error::Init("poll timer start failed"))?;
    log::info!("hw_timer: keypad poll every {} ms", period_ms);
    Ok(PollTimer { _timer: timer })
}

#[cfg(not(target_os = "espidf"))]
pub fn start_poll_timer(
    period_ms: u32,
    mut callback: impl FnMut() + Send + 'static,
) -> Result<PollTimer, Error> {
    let period = std::time::Duration::from_millis(u64::from(period_ms.max(1)));
    let thread = std::thread::Builder::new()
        .name("poll".into())
        .spawn(move || {
            loop {
                std::thread::sleep(period);
                callback();
            }
        })
        .map_err(|_| Error::Init("poll thread spawn failed"))?;
    log::debug!("hw_timer(host): keypad poll every {} ms", period_ms);
    Ok(PollTimer { _thread: thread })
}
