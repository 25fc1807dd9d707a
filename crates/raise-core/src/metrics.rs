//! Global atomic counters for engine observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a CLI command or request completes).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters — no allocations, no locking.
pub struct Metrics {
    levels_calculated: AtomicU64,
    condition_failures: AtomicU64,
    checkpoints_resolved: AtomicU64,
    matrix_fallbacks: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            levels_calculated: AtomicU64::new(0),
            condition_failures: AtomicU64::new(0),
            checkpoints_resolved: AtomicU64::new(0),
            matrix_fallbacks: AtomicU64::new(0),
        }
    }

    /// Increment the levels-calculated counter by one.
    pub fn inc_levels_calculated(&self) {
        self.levels_calculated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "levels_calculated", "counter incremented");
    }

    /// Increment the condition-failures counter by one.
    pub fn inc_condition_failures(&self) {
        self.condition_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "condition_failures", "counter incremented");
    }

    /// Add `n` resolved checkpoints.
    pub fn add_checkpoints_resolved(&self, n: u64) {
        self.checkpoints_resolved.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "checkpoints_resolved", n, "counter incremented");
    }

    /// Increment the matrix-fallbacks counter by one.
    pub fn inc_matrix_fallbacks(&self) {
        self.matrix_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "matrix_fallbacks", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            levels_calculated = self.levels_calculated(),
            condition_failures = self.condition_failures(),
            checkpoints_resolved = self.checkpoints_resolved(),
            matrix_fallbacks = self.matrix_fallbacks(),
        );
    }

    pub fn levels_calculated(&self) -> u64 {
        self.levels_calculated.load(Ordering::Relaxed)
    }

    pub fn condition_failures(&self) -> u64 {
        self.condition_failures.load(Ordering::Relaxed)
    }

    pub fn checkpoints_resolved(&self) -> u64 {
        self.checkpoints_resolved.load(Ordering::Relaxed)
    }

    pub fn matrix_fallbacks(&self) -> u64 {
        self.matrix_fallbacks.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.levels_calculated.store(0, Ordering::Relaxed);
        self.condition_failures.store(0, Ordering::Relaxed);
        self.checkpoints_resolved.store(0, Ordering::Relaxed);
        self.matrix_fallbacks.store(0, Ordering::Relaxed);
    }
}
