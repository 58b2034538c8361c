//! Statistics tracking for the allocation engine.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Operation counters for a [`HeapEngine`](crate::engine::HeapEngine).
///
/// Counters use relaxed atomics so read-side diagnostics never contend with
/// the engine; recording is skipped entirely unless the engine config has
/// `track_stats` set.
#[derive(Debug, Default)]
pub struct EngineStats {
    // Operation counts
    allocations: AtomicU64,
    frees: AtomicU64,
    failed_allocations: AtomicU64,
    splits: AtomicU64,
    coalesces: AtomicU64,
    inits: AtomicU64,

    // Byte accounting
    bytes_in_use: AtomicUsize,
    peak_bytes_in_use: AtomicUsize,
}

impl EngineStats {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful allocations.
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Successful frees.
    pub fn frees(&self) -> u64 {
        self.frees.load(Ordering::Relaxed)
    }

    /// Allocations rejected for exhaustion or table capacity.
    pub fn failed_allocations(&self) -> u64 {
        self.failed_allocations.load(Ordering::Relaxed)
    }

    /// Splits performed (allocation left a free remainder).
    pub fn splits(&self) -> u64 {
        self.splits.load(Ordering::Relaxed)
    }

    /// Merges of adjacent free blocks.
    pub fn coalesces(&self) -> u64 {
        self.coalesces.load(Ordering::Relaxed)
    }

    /// Times the engine was (re)initialized.
    pub fn inits(&self) -> u64 {
        self.inits.load(Ordering::Relaxed)
    }

    /// Bytes currently handed out.
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use.load(Ordering::Relaxed)
    }

    /// High-water mark of bytes handed out since the last init.
    pub fn peak_bytes_in_use(&self) -> usize {
        self.peak_bytes_in_use.load(Ordering::Relaxed)
    }

    // Internal update methods

    pub(crate) fn record_init(&self) {
        self.inits.fetch_add(1, Ordering::Relaxed);
        self.bytes_in_use.store(0, Ordering::Relaxed);
        self.peak_bytes_in_use.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_allocation(&self, bytes: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let now = self.bytes_in_use.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_bytes_in_use.fetch_max(now, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_allocation(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_free(&self, bytes: usize) {
        self.frees.fetch_add(1, Ordering::Relaxed);
        self.bytes_in_use.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_split(&self) {
        self.splits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesce(&self) {
        self.coalesces.fetch_add(1, Ordering::Relaxed);
    }

    /// Creates a snapshot of current statistics.
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            allocations: self.allocations(),
            frees: self.frees(),
            failed_allocations: self.failed_allocations(),
            splits: self.splits(),
            coalesces: self.coalesces(),
            inits: self.inits(),
            bytes_in_use: self.bytes_in_use(),
            peak_bytes_in_use: self.peak_bytes_in_use(),
        }
    }
}

/// Immutable snapshot of engine statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatsSnapshot {
    /// Successful allocations.
    pub allocations: u64,
    /// Successful frees.
    pub frees: u64,
    /// Rejected allocations.
    pub failed_allocations: u64,
    /// Splits performed.
    pub splits: u64,
    /// Adjacent-free merges performed.
    pub coalesces: u64,
    /// Engine initializations.
    pub inits: u64,
    /// Bytes currently handed out.
    pub bytes_in_use: usize,
    /// High-water mark of bytes handed out.
    pub peak_bytes_in_use: usize,
}

impl std::fmt::Display for EngineStatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Engine statistics:")?;
        writeln!(f, "  Operations:")?;
        writeln!(f, "    Allocations: {}", self.allocations)?;
        writeln!(f, "    Frees: {}", self.frees)?;
        writeln!(f, "    Failed allocations: {}", self.failed_allocations)?;
        writeln!(f, "    Splits: {}", self.splits)?;
        writeln!(f, "    Coalesces: {}", self.coalesces)?;
        writeln!(f, "    Inits: {}", self.inits)?;
        writeln!(f, "  Memory:")?;
        writeln!(f, "    In use: {} bytes", self.bytes_in_use)?;
        writeln!(f, "    Peak in use: {} bytes", self.peak_bytes_in_use)?;
        Ok(())
    }
}
