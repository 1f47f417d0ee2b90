//! Transmit coordinator: serialises frames onto the radio link.
//!
//! The link sits behind an async mutex so frames from concurrent callers
//! never interleave on the wire.  Lock acquisition is wrapped in a timeout
//! purely as a diagnostic: when it fires a warning is logged and counted,
//! and the wait resumes.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{Duration, with_timeout};
use futures_lite::future::block_on;
use log::warn;

use crate::app::ports::RadioLink;
use crate::diagnostics::PipelineStats;
use crate::error::RadioError;
use crate::frame::FrameBuf;

pub struct Transmitter<L: RadioLink> {
    link: Mutex<CriticalSectionRawMutex, L>,
    lock_warn_after: Duration,
}

impl<L: RadioLink> Transmitter<L> {
    pub fn new(link: L, lock_warn_after: Duration) -> Self {
        Self {
            link: Mutex::new(link),
            lock_warn_after,
        }
    }

    /// Write every frame, back to back, under one lock acquisition.
    pub fn transmit(&self, frames: &[FrameBuf], stats: &PipelineStats) -> Result<(), RadioError> {
        let mut link = block_on(self.acquire(stats));
        for frame in frames {
            write_all(&mut *link, frame)?;
            PipelineStats::bump(&stats.frames_sent);
        }
        link.flush().map_err(|_| RadioError::WriteFailed)
    }

    /// Run `f` with exclusive access to the link.
    pub fn with_link<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        let mut link = block_on(self.link.lock());
        f(&mut link)
    }

    async fn acquire(&self, stats: &PipelineStats) -> MutexGuard<'_, CriticalSectionRawMutex, L> {
        loop {
            match with_timeout(self.lock_warn_after, self.link.lock()).await {
                Ok(guard) => return guard,
                Err(_) => {
                    PipelineStats::bump(&stats.tx_lock_timeouts);
                    warn!(
                        "transmit lock held for more than {} ms, still waiting",
                        self.lock_warn_after.as_millis()
                    );
                }
            }
        }
    }
}

fn write_all<L: RadioLink>(link: &mut L, mut data: &[u8]) -> Result<(), RadioError> {
    while !data.is_empty() {
        match link.write(data) {
            Ok(0) => return Err(RadioError::ShortWrite),
            Ok(n) => data = &data[n.min(data.len())..],
            Err(e) => {
                warn!("radio write failed: {:?}", e);
                return Err(RadioError::WriteFailed);
            }
        }
    }
    Ok(())
}
