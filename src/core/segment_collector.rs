//! Streaming merge of per-position hits into growing segments.
//!
//! At every search position the caller adds the hits found for that position and
//! then calls `end_position`. Each hit either extends a live segment whose end lies
//! exactly `step_size` behind it, or starts a new one-bin segment. Live segments that
//! received no hit are closed and handed to a [`SegmentWriter`].
//!
//! Segment storage comes from a fixed [`SegmentPool`]; nothing is allocated per
//! position.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;

use crate::error::ScanError;

use super::segment::{Segment, SegmentCollection, SegmentHandle, SegmentPool};

/// Receives closed segments together with the search position at which they closed.
pub trait SegmentWriter {
    fn write(&mut self, segment: &Segment, search_position: u32) -> Result<(), ScanError>;
}

/// Pack a hit so that sorting the packed values orders by sequence id, then position.
#[inline]
pub fn pack(sequence_id: u32, position: u32) -> u64 {
    ((sequence_id as u64) << 32) | position as u64
}

#[inline]
pub fn unpack(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

/// Counters kept by one collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub hits: u64,
    pub created: u64,
    pub extended: u64,
    pub closed: u64,
}

impl CollectorStats {
    pub fn merge(&mut self, other: &CollectorStats) {
        self.hits += other.hits;
        self.created += other.created;
        self.extended += other.extended;
        self.closed += other.closed;
    }
}

/// Holds the hits of one search position and merges them into live segments.
pub struct SegmentCollector {
    values: Vec<u64>,
    capacity: usize,
    word_size: u32,
    step_size: u32,
    last_closed_end: FxHashMap<u32, u32>,
    stats: CollectorStats,
}

impl SegmentCollector {
    /// `capacity` bounds the number of hits added between two `end_position` calls.
    pub fn new(capacity: usize, word_size: u32, step_size: u32) -> Result<Self, ScanError> {
        if step_size < 1 || word_size < step_size {
            return Err(ScanError::InvalidConfig(format!(
                "need word_size >= step_size >= 1, got word_size={} step_size={}",
                word_size, step_size
            )));
        }
        Ok(Self {
            values: Vec::with_capacity(capacity),
            capacity,
            word_size,
            step_size,
            last_closed_end: FxHashMap::default(),
            stats: CollectorStats::default(),
        })
    }

    pub fn word_size(&self) -> u32 {
        self.word_size
    }

    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    /// Number of hits waiting for `end_position`.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    /// Record a hit whose window ends at `position` on build sequence `sequence_id`.
    pub fn add(&mut self, sequence_id: u32, position: u32) {
        assert!(
            position + 1 >= self.word_size,
            "posn={} wordSize={}",
            position,
            self.word_size
        );
        assert!(
            self.values.len() < self.capacity,
            "more than {} hits at one search position",
            self.capacity
        );
        self.values.push(pack(sequence_id, position));
        self.stats.hits += 1;
    }

    /// Merge the pending hits with `previous` into `current`.
    ///
    /// On return `previous` and the hit batch are empty; every segment that was in
    /// `previous` has either moved to `current` or been written and released.
    pub fn end_position(
        &mut self,
        previous: &mut SegmentCollection,
        current: &mut SegmentCollection,
        pool: &mut SegmentPool,
        search_position: u32,
        writer: &mut dyn SegmentWriter,
    ) -> Result<(), ScanError> {
        assert!(current.is_empty(), "current collection must start empty");
        self.values.sort_unstable();
        let size = previous.len();
        let mut i = 0; // into values
        let mut j = 0; // into previous
        loop {
            if i == self.values.len() {
                if j == size {
                    break;
                }
                self.close(previous.get(j), pool, search_position, writer)?;
                j += 1;
                continue;
            }
            let (sequence_id, position) = unpack(self.values[i]);
            if j == size {
                self.create(sequence_id, position, current, pool)?;
                i += 1;
                continue;
            }
            let handle = previous.get(j);
            let seg = pool.get(handle);
            // Sequence id is compared before position.
            let hit_key = (sequence_id, position as i64 - self.step_size as i64);
            let seg_key = (seg.sequence_id(), seg.end() as i64);
            match hit_key.cmp(&seg_key) {
                Ordering::Equal => {
                    pool.get_mut(handle).extend(position);
                    current.push(handle);
                    self.stats.extended += 1;
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    self.create(sequence_id, position, current, pool)?;
                    i += 1;
                }
                Ordering::Greater => {
                    self.close(handle, pool, search_position, writer)?;
                    j += 1;
                }
            }
        }
        previous.clear();
        self.values.clear();
        Ok(())
    }

    /// Close every segment in `live`, e.g. at the end of a search sequence.
    pub fn flush(
        &mut self,
        live: &mut SegmentCollection,
        pool: &mut SegmentPool,
        search_position: u32,
        writer: &mut dyn SegmentWriter,
    ) -> Result<(), ScanError> {
        assert!(self.values.is_empty(), "flush with pending hits");
        for handle in live.iter() {
            self.close(handle, pool, search_position, writer)?;
        }
        live.clear();
        self.last_closed_end.clear();
        Ok(())
    }

    fn close(
        &mut self,
        handle: SegmentHandle,
        pool: &mut SegmentPool,
        search_position: u32,
        writer: &mut dyn SegmentWriter,
    ) -> Result<(), ScanError> {
        let seg = pool.get_mut(handle);
        let start = seg.start() as i64;
        let previous_end = self.last_closed_end.insert(seg.sequence_id(), seg.end());
        seg.set_distance(previous_end.map(|end| start - end as i64));
        writer.write(seg, search_position)?;
        pool.release(handle);
        self.stats.closed += 1;
        Ok(())
    }

    fn create(
        &mut self,
        sequence_id: u32,
        position: u32,
        current: &mut SegmentCollection,
        pool: &mut SegmentPool,
    ) -> Result<(), ScanError> {
        let handle = pool.acquire().ok_or(ScanError::FreeListExhausted {
            capacity: pool.capacity(),
        })?;
        pool.get_mut(handle)
            .initialize(sequence_id, position + 1 - self.word_size, position);
        current.push(handle);
        self.stats.created += 1;
        Ok(())
    }
}

/// Collector plus the pool and the two collections it alternates between.
pub struct SegmentAggregator {
    collector: SegmentCollector,
    pool: SegmentPool,
    live: SegmentCollection,
    next: SegmentCollection,
}

impl SegmentAggregator {
    /// `max_hits` is the largest number of hits one search position can produce.
    /// The pool holds twice that: the survivors of the previous position and the
    /// segments of the current one.
    pub fn new(max_hits: usize, word_size: u32, step_size: u32) -> Result<Self, ScanError> {
        let slots = (2 * max_hits).max(1);
        Ok(Self {
            collector: SegmentCollector::new(max_hits, word_size, step_size)?,
            pool: SegmentPool::with_capacity(slots),
            live: SegmentCollection::with_capacity(slots),
            next: SegmentCollection::with_capacity(slots),
        })
    }

    #[inline]
    pub fn add(&mut self, sequence_id: u32, position: u32) {
        self.collector.add(sequence_id, position);
    }

    pub fn end_position(
        &mut self,
        search_position: u32,
        writer: &mut dyn SegmentWriter,
    ) -> Result<(), ScanError> {
        self.collector.end_position(
            &mut self.live,
            &mut self.next,
            &mut self.pool,
            search_position,
            writer,
        )?;
        std::mem::swap(&mut self.live, &mut self.next);
        Ok(())
    }

    pub fn flush(
        &mut self,
        search_position: u32,
        writer: &mut dyn SegmentWriter,
    ) -> Result<(), ScanError> {
        self.collector
            .flush(&mut self.live, &mut self.pool, search_position, writer)
    }

    pub fn live_segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.live.iter().map(move |h| self.pool.get(h))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn stats(&self) -> &CollectorStats {
        self.collector.stats()
    }

    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }
}
