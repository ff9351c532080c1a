//! Per-partition result sinks.

use crate::common::SegmentRecord;
use crate::core::{Segment, SegmentWriter};
use crate::error::ScanError;

/// A [`SegmentWriter`] that is told which search sequence the following segments
/// belong to. One instance per partition.
pub trait RegionWriter: SegmentWriter + Send {
    fn begin_sequence(&mut self, search_id: u64);
}

/// Collects closed segments as [`SegmentRecord`]s.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    search_id: u64,
    records: Vec<SegmentRecord>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SegmentRecord> {
        self.records
    }
}

impl SegmentWriter for SegmentBuffer {
    fn write(&mut self, segment: &Segment, search_position: u32) -> Result<(), ScanError> {
        self.records.push(SegmentRecord {
            search_id: self.search_id,
            search_position,
            build_id: segment.sequence_id(),
            build_start: segment.start(),
            build_end: segment.end() + 1,
            bins: segment.bins(),
            distance: segment.distance(),
        });
        Ok(())
    }
}

impl RegionWriter for SegmentBuffer {
    fn begin_sequence(&mut self, search_id: u64) {
        self.search_id = search_id;
    }
}
