//! Runtime pipeline counters.
//!
//! Every worker bumps relaxed atomics here; the main task logs a summary
//! periodically.  Counters wrap rather than saturate and are never reset.

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub frames_received: AtomicU32,
    pub checksum_failures: AtomicU32,
    pub rx_overflow: AtomicU32,
    pub unknown_nodes: AtomicU32,
    pub dropped_frames: AtomicU32,
    pub registry_full: AtomicU32,
    pub mailbox_timeouts: AtomicU32,
    pub commands_sent: AtomicU32,
    pub frames_sent: AtomicU32,
    pub tx_failures: AtomicU32,
    pub tx_lock_timeouts: AtomicU32,
}

/// Plain copy of [`PipelineStats`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub frames_received: u32,
    pub checksum_failures: u32,
    pub rx_overflow: u32,
    pub unknown_nodes: u32,
    pub dropped_frames: u32,
    pub registry_full: u32,
    pub mailbox_timeouts: u32,
    pub commands_sent: u32,
    pub frames_sent: u32,
    pub tx_failures: u32,
    pub tx_lock_timeouts: u32,
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            frames_received: AtomicU32::new(0),
            checksum_failures: AtomicU32::new(0),
            rx_overflow: AtomicU32::new(0),
            unknown_nodes: AtomicU32::new(0),
            dropped_frames: AtomicU32::new(0),
            registry_full: AtomicU32::new(0),
            mailbox_timeouts: AtomicU32::new(0),
            commands_sent: AtomicU32::new(0),
            frames_sent: AtomicU32::new(0),
            tx_failures: AtomicU32::new(0),
            tx_lock_timeouts: AtomicU32::new(0),
        }
    }

    pub fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU32, n: u32) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU32| c.load(Ordering::Relaxed);
        StatsSnapshot {
            frames_received: load(&self.frames_received),
            checksum_failures: load(&self.checksum_failures),
            rx_overflow: load(&self.rx_overflow),
            unknown_nodes: load(&self.unknown_nodes),
            dropped_frames: load(&self.dropped_frames),
            registry_full: load(&self.registry_full),
            mailbox_timeouts: load(&self.mailbox_timeouts),
            commands_sent: load(&self.commands_sent),
            frames_sent: load(&self.frames_sent),
            tx_failures: load(&self.tx_failures),
            tx_lock_timeouts: load(&self.tx_lock_timeouts),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            "rx: {} frames ({} bad chk, {} overflow, {} unknown, {} dropped) | tx: {} cmds / {} frames ({} failed, {} lock waits) | {} mailbox timeouts",
            s.frames_received,
            s.checksum_failures,
            s.rx_overflow,
            s.unknown_nodes,
            s.dropped_frames,
            s.commands_sent,
            s.frames_sent,
            s.tx_failures,
            s.tx_lock_timeouts,
            s.mailbox_timeouts
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = PipelineStats::new();
        PipelineStats::bump(&stats.frames_received);
        PipelineStats::bump(&stats.frames_received);
        PipelineStats::add(&stats.frames_sent, 3);
        let s = stats.snapshot();
        assert_eq!(s.frames_received, 2);
        assert_eq!(s.frames_sent, 3);
        assert_eq!(s.tx_failures, 0);
    }
}
