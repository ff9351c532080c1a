use clap::Args;
use std::path::PathBuf;

use crate::config::{SearchConfig, DEFAULT_THREAD_MULTIPLIER, DEFAULT_WORD_SIZE};
use crate::error::ScanError;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Sequences stored in the index (FASTA)
    #[arg(short, long)]
    pub build: PathBuf,
    /// Sequences scanned against the index (FASTA)
    #[arg(short, long)]
    pub search: PathBuf,
    #[arg(short, long, default_value_t = DEFAULT_WORD_SIZE)]
    pub word_size: usize,
    /// Distance between queried search positions. Must not exceed --word-size.
    #[arg(long, default_value_t = 1)]
    pub step_size: usize,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    /// Partitions per thread; more partitions balance uneven sequences better
    #[arg(long, default_value_t = DEFAULT_THREAD_MULTIPLIER)]
    pub thread_multiplier: usize,
    /// Skip hashes stored more often than this in the index (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_hash_count: usize,
    /// First search sequence to scan (0-based)
    #[arg(long)]
    pub start: Option<u64>,
    /// Search sequence at which the scan stops (exclusive)
    #[arg(long)]
    pub end: Option<u64>,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Write a `#` column header line
    #[arg(long, default_value_t = false)]
    pub header: bool,
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl SearchArgs {
    /// Resolve thread count, limits and sequence range. The result still needs
    /// `validate`.
    pub fn to_config(&self) -> Result<SearchConfig, ScanError> {
        SearchConfig {
            word_size: self.word_size,
            step_size: self.step_size,
            thread_multiplier: self.thread_multiplier,
            show_progress: self.progress,
            ..SearchConfig::default()
        }
        .with_threads(self.num_threads)
        .with_max_hash_count(self.max_hash_count)
        .with_sequence_range(self.start, self.end)
    }
}
