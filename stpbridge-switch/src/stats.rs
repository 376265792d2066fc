//! Switch counters
//!
//! Plain atomics bumped by the dispatch loop and the scheduler. Read them
//! through [`SwitchStats::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe switch counters
#[derive(Debug, Default)]
pub struct SwitchStats {
    pub frames_received: AtomicU64,
    /// Copies sent on some port, flooded copies included
    pub frames_forwarded: AtomicU64,
    /// Copies withheld by the egress policy
    pub frames_dropped: AtomicU64,
    /// Frames sent to every other port
    pub frames_flooded: AtomicU64,
    pub bpdus_received: AtomicU64,
    pub bpdus_sent: AtomicU64,
    pub decode_errors: AtomicU64,
}

/// Plain copy of [`SwitchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_received: u64,
    pub frames_forwarded: u64,
    pub frames_dropped: u64,
    pub frames_flooded: u64,
    pub bpdus_received: u64,
    pub bpdus_sent: u64,
    pub decode_errors: u64,
}

impl SwitchStats {
    pub fn increment_frames_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_frames_forwarded(&self) {
        self.frames_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_frames_forwarded(&self, count: u64) {
        self.frames_forwarded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_frames_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_frames_flooded(&self) {
        self.frames_flooded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bpdus_received(&self) {
        self.bpdus_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bpdus_sent(&self, count: u64) {
        self.bpdus_sent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_forwarded: self.frames_forwarded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_flooded: self.frames_flooded.load(Ordering::Relaxed),
            bpdus_received: self.bpdus_received.load(Ordering::Relaxed),
            bpdus_sent: self.bpdus_sent.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}
