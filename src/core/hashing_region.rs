//! Regions of the search collection assigned to a single scanning task.
//!
//! A region runs from `(start_sequence, start_pos)` inclusive to
//! `(end_sequence, end_pos)` exclusive. The padded extent widens the first and last
//! sequence so a worker can warm up its window hash before the region proper; only
//! the authoritative extent decides which positions a worker reports.

use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingRegion {
    start_sequence: u64,
    start_pos: u64,
    end_sequence: u64,
    end_pos: u64,
    padded_start: u64,
    padded_end: u64,
    unrestricted: bool,
}

impl HashingRegion {
    /// No partitioning: the whole input.
    pub const NONE: HashingRegion = HashingRegion {
        start_sequence: 0,
        start_pos: 0,
        end_sequence: u64::MAX,
        end_pos: 0,
        padded_start: 0,
        padded_end: 0,
        unrestricted: true,
    };

    /// Region without padding.
    pub fn new(start_sequence: u64, start_pos: u64, end_sequence: u64, end_pos: u64) -> Self {
        Self::with_padding(start_sequence, start_pos, end_sequence, end_pos, start_pos, end_pos)
    }

    /// Region with a padded extent. `padded_start` is a position on `start_sequence`,
    /// `padded_end` a position on `end_sequence`.
    pub fn with_padding(
        start_sequence: u64,
        start_pos: u64,
        end_sequence: u64,
        end_pos: u64,
        padded_start: u64,
        padded_end: u64,
    ) -> Self {
        assert!(
            (start_sequence, start_pos) <= (end_sequence, end_pos),
            "region start {}:{} after end {}:{}",
            start_sequence,
            start_pos,
            end_sequence,
            end_pos
        );
        assert!(
            padded_start <= start_pos && padded_end >= end_pos,
            "padded extent {}..{} does not contain {}..{}",
            padded_start,
            padded_end,
            start_pos,
            end_pos
        );
        Self {
            start_sequence,
            start_pos,
            end_sequence,
            end_pos,
            padded_start,
            padded_end,
            unrestricted: false,
        }
    }

    /// Whole sequences `first..end_exclusive`.
    pub fn sequences(first: u64, end_exclusive: u64) -> Self {
        Self::new(first, 0, end_exclusive, 0)
    }

    pub fn is_none(&self) -> bool {
        self.unrestricted
    }

    pub fn start_sequence(&self) -> u64 {
        self.start_sequence
    }

    pub fn start_pos(&self) -> u64 {
        self.start_pos
    }

    pub fn end_sequence(&self) -> u64 {
        self.end_sequence
    }

    pub fn end_pos(&self) -> u64 {
        self.end_pos
    }

    pub fn padded_start(&self) -> u64 {
        self.padded_start
    }

    pub fn padded_end(&self) -> u64 {
        self.padded_end
    }

    /// Sequence ids touched by the padded extent, clipped to `number_sequences`.
    pub fn sequence_range(&self, number_sequences: u64) -> Range<u64> {
        if self.unrestricted {
            return 0..number_sequences;
        }
        let end = if self.padded_end > 0 {
            self.end_sequence + 1
        } else {
            self.end_sequence
        };
        self.start_sequence.min(number_sequences)..end.min(number_sequences)
    }

    /// True when `(seq, pos)` lies in the authoritative extent.
    pub fn is_in_range(&self, seq: u64, pos: u64) -> bool {
        self.unrestricted
            || ((seq, pos) >= (self.start_sequence, self.start_pos)
                && (seq, pos) < (self.end_sequence, self.end_pos))
    }

    /// Positions of sequence `seq` (of length `len`) inside the padded extent.
    pub fn padded_positions(&self, seq: u64, len: usize) -> Range<usize> {
        if self.unrestricted {
            return 0..len;
        }
        if seq < self.start_sequence || seq > self.end_sequence {
            return 0..0;
        }
        let lo = if seq == self.start_sequence {
            clip(self.padded_start, len)
        } else {
            0
        };
        let hi = if seq == self.end_sequence {
            clip(self.padded_end, len)
        } else {
            len
        };
        lo..hi.max(lo)
    }
}

fn clip(pos: u64, len: usize) -> usize {
    usize::try_from(pos).map_or(len, |p| p.min(len))
}

impl fmt::Display for HashingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unrestricted {
            return write!(f, "NONE");
        }
        let whole_sequences = self.start_pos == 0
            && self.end_pos == 0
            && self.padded_start == 0
            && self.padded_end == 0;
        if whole_sequences && self.end_sequence > self.start_sequence {
            let last = self.end_sequence - 1;
            if last == self.start_sequence {
                write!(f, "{}", self.start_sequence)
            } else {
                write!(f, "{}:{}", self.start_sequence, last)
            }
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start_sequence, self.start_pos, self.end_sequence, self.end_pos
            )
        }
    }
}
