//! Resolved search parameters
//!
//! Built from the command line (see `algorithm::search::SearchArgs`) or directly by
//! library users; `validate` must pass before a scan starts.

use crate::core::HashingRegion;
use crate::error::ScanError;
use crate::seed::MAX_WINDOW_SIZE;

pub const DEFAULT_WORD_SIZE: usize = 12;
pub const DEFAULT_STEP_SIZE: usize = 1;
pub const DEFAULT_THREAD_MULTIPLIER: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Window length hashed on both collections
    pub word_size: usize,
    /// Stride between queried search positions
    pub step_size: usize,
    /// Worker threads (already resolved, never 0)
    pub num_threads: usize,
    /// Partitions per thread
    pub thread_multiplier: usize,
    /// Hashes stored more often than this are skipped as repeats (None = unlimited)
    pub max_hash_count: Option<usize>,
    pub show_progress: bool,
    /// Search sequences to scan; `HashingRegion::NONE` scans all of them
    pub region: HashingRegion,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            word_size: DEFAULT_WORD_SIZE,
            step_size: DEFAULT_STEP_SIZE,
            num_threads: 1,
            thread_multiplier: DEFAULT_THREAD_MULTIPLIER,
            max_hash_count: None,
            show_progress: false,
            region: HashingRegion::NONE,
        }
    }
}

impl SearchConfig {
    /// `num_threads == 0` resolves to every available CPU.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads
        };
        self
    }

    /// `0` means unlimited.
    pub fn with_max_hash_count(mut self, max_hash_count: usize) -> Self {
        self.max_hash_count = (max_hash_count > 0).then_some(max_hash_count);
        self
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.step_size < 1 {
            return Err(ScanError::InvalidConfig(
                "step size must be at least 1".to_string(),
            ));
        }
        if self.word_size < self.step_size {
            return Err(ScanError::InvalidConfig(format!(
                "word size {} is smaller than step size {}",
                self.word_size, self.step_size
            )));
        }
        if self.word_size > MAX_WINDOW_SIZE {
            return Err(ScanError::InvalidConfig(format!(
                "word size {} exceeds the maximum of {}",
                self.word_size, MAX_WINDOW_SIZE
            )));
        }
        if self.num_threads == 0 || self.thread_multiplier == 0 {
            return Err(ScanError::InvalidConfig(format!(
                "need at least one job, got {} threads x {}",
                self.num_threads, self.thread_multiplier
            )));
        }
        Ok(())
    }

    /// Restrict the scan to search sequences `start..end`. Either bound may be open.
    pub fn with_sequence_range(
        mut self,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<Self, ScanError> {
        if start.is_none() && end.is_none() {
            self.region = HashingRegion::NONE;
            return Ok(self);
        }
        let first = start.unwrap_or(0);
        let end = end.unwrap_or(u64::MAX);
        if first > end {
            return Err(ScanError::InvalidConfig(format!(
                "sequence range start {} is after end {}",
                first, end
            )));
        }
        self.region = HashingRegion::sequences(first, end);
        Ok(self)
    }
}
