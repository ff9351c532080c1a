//! Error types for segscan.

use thiserror::Error;

/// Errors raised by the search engine.
///
/// Contract violations (a hit before the first full window, querying an index that
/// is still being built, ...) are not represented here: they panic.
#[derive(Debug, Error)]
pub enum ScanError {
    /// IO error while reading sequences or writing results.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a FASTA file.
    #[error("FASTA parse error: {0}")]
    FastaParse(String),

    /// Rejected configuration (word/step sizes, thread counts, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No free segment was left when a new one had to be created.
    #[error("free list empty: all {capacity} segment slots are live")]
    FreeListExhausted { capacity: usize },

    /// A sequence id outside the reader.
    #[error("Sequence id {id} out of range (reader holds {count} sequences)")]
    SequenceOutOfRange { id: u64, count: u64 },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The partition stopped because another partition failed.
    #[error("Scan aborted after a failure in another partition")]
    Aborted,
}
