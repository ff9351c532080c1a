//! Diagnostic counters for the partitioned scan
//!
//! Tracks how many windows reach the index, how many are dropped as repeats and how
//! hits turn into segments. Enabled via the SEGSCAN_DIAGNOSTICS environment variable.
//!
//! Counters are shared by all workers; each partition folds its local collector
//! statistics in once when it finishes.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::core::CollectorStats;

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("SEGSCAN_DIAGNOSTICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

#[derive(Default, Debug)]
pub struct ScanDiagnostics {
    // Hash stage
    pub windows_hashed: AtomicUsize,
    pub windows_queried: AtomicUsize,
    pub repeats_skipped: AtomicUsize,
    // Merge stage
    pub hits: AtomicUsize,
    pub segments_created: AtomicUsize,
    pub segments_extended: AtomicUsize,
    pub segments_closed: AtomicUsize,
    // Scheduling
    pub partitions_finished: AtomicUsize,
}

impl ScanDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the counters of one finished partition in.
    pub fn record(&self, stats: &CollectorStats) {
        self.hits
            .fetch_add(stats.hits as usize, AtomicOrdering::Relaxed);
        self.segments_created
            .fetch_add(stats.created as usize, AtomicOrdering::Relaxed);
        self.segments_extended
            .fetch_add(stats.extended as usize, AtomicOrdering::Relaxed);
        self.segments_closed
            .fetch_add(stats.closed as usize, AtomicOrdering::Relaxed);
        self.partitions_finished.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Fold in the window counters of one partition.
    pub fn record_windows(&self, hashed: usize, queried: usize, repeats: usize) {
        self.windows_hashed.fetch_add(hashed, AtomicOrdering::Relaxed);
        self.windows_queried.fetch_add(queried, AtomicOrdering::Relaxed);
        self.repeats_skipped.fetch_add(repeats, AtomicOrdering::Relaxed);
    }

    /// Collector statistics summed over every finished partition.
    pub fn collector_totals(&self) -> CollectorStats {
        CollectorStats {
            hits: self.hits.load(AtomicOrdering::Relaxed) as u64,
            created: self.segments_created.load(AtomicOrdering::Relaxed) as u64,
            extended: self.segments_extended.load(AtomicOrdering::Relaxed) as u64,
            closed: self.segments_closed.load(AtomicOrdering::Relaxed) as u64,
        }
    }

    /// Log a summary of all counters at info level.
    pub fn log_summary(&self) {
        log::info!("=== Scan Diagnostics ===");
        log::info!("Hash Stage:");
        log::info!(
            "  Windows hashed:             {}",
            self.windows_hashed.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "  Windows queried:            {}",
            self.windows_queried.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "  Skipped (repeat hash):      {}",
            self.repeats_skipped.load(AtomicOrdering::Relaxed)
        );
        log::info!("Merge Stage:");
        log::info!(
            "  Hits:                       {}",
            self.hits.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "  Segments created:           {}",
            self.segments_created.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "  Segments extended:          {}",
            self.segments_extended.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "  Segments closed:            {}",
            self.segments_closed.load(AtomicOrdering::Relaxed)
        );
        log::info!(
            "Partitions finished:          {}",
            self.partitions_finished.load(AtomicOrdering::Relaxed)
        );
    }
}
