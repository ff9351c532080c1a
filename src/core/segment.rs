//! Segments, the slab they live in, and ordered collections of live segments.

use std::fmt;

/// Contiguous run of hits on one build sequence.
///
/// `start` is the first residue of the first window, `end` the window-end position
/// of the last absorbed hit. Extension only ever moves `end`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    sequence_id: u32,
    start: u32,
    end: u32,
    bins: u32,
    distance: Option<i64>,
}

impl Segment {
    /// Reset to a fresh single-hit segment.
    pub fn initialize(&mut self, sequence_id: u32, start: u32, end: u32) {
        debug_assert!(start <= end);
        self.sequence_id = sequence_id;
        self.start = start;
        self.end = end;
        self.bins = 1;
        self.distance = None;
    }

    /// Absorb one more hit ending at `end`.
    pub fn extend(&mut self, end: u32) {
        debug_assert!(end > self.end, "extension must advance the end");
        self.end = end;
        self.bins += 1;
    }

    pub fn clear(&mut self) {
        *self = Segment::default();
    }

    pub fn is_empty(&self) -> bool {
        self.bins == 0
    }

    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Gap between this segment's start and the end of the previous segment closed
    /// on the same sequence. Negative when they overlap.
    pub fn distance(&self) -> Option<i64> {
        self.distance
    }

    pub(crate) fn set_distance(&mut self, distance: Option<i64>) {
        self.distance = distance;
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seq={} [{},{}] bins={}",
            self.sequence_id, self.start, self.end, self.bins
        )?;
        if let Some(distance) = self.distance {
            write!(f, " distance={}", distance)?;
        }
        Ok(())
    }
}

/// Index of a slot in a [`SegmentPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentHandle(u32);

/// Fixed-size slab of segments with a free list.
///
/// Slots are allocated once; `acquire` and `release` only move handles.
pub struct SegmentPool {
    slots: Vec<Segment>,
    free: Vec<SegmentHandle>,
}

impl SegmentPool {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = vec![Segment::default(); capacity];
        // Reversed so the lowest slot is handed out first.
        let free = (0..capacity as u32).rev().map(SegmentHandle).collect();
        Self { slots, free }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Take an empty slot, `None` when every slot is live.
    pub fn acquire(&mut self) -> Option<SegmentHandle> {
        self.free.pop()
    }

    /// Clear a slot and put it back on the free list.
    pub fn release(&mut self, handle: SegmentHandle) {
        self.slots[handle.0 as usize].clear();
        debug_assert!(self.free.len() < self.slots.len());
        self.free.push(handle);
    }

    #[inline]
    pub fn get(&self, handle: SegmentHandle) -> &Segment {
        &self.slots[handle.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, handle: SegmentHandle) -> &mut Segment {
        &mut self.slots[handle.0 as usize]
    }
}

/// Live segments ordered by `(sequence_id, end)`.
///
/// Segments are appended in the order hits are merged, so the order holds by
/// construction; on one sequence it is also the order of first appearance.
#[derive(Debug, Default)]
pub struct SegmentCollection {
    handles: Vec<SegmentHandle>,
}

impl SegmentCollection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> SegmentHandle {
        self.handles[i]
    }

    /// Append a handle. Callers push in ascending order.
    #[inline]
    pub fn push(&mut self, handle: SegmentHandle) {
        self.handles.push(handle);
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = SegmentHandle> + '_ {
        self.handles.iter().copied()
    }

    /// True when the segments are ascending by `(sequence_id, end)`, the order the
    /// merge walk depends on.
    pub fn is_ordered(&self, pool: &SegmentPool) -> bool {
        self.handles.windows(2).all(|pair| {
            let a = pool.get(pair[0]);
            let b = pool.get(pair[1]);
            (a.sequence_id(), a.end()) <= (b.sequence_id(), b.end())
        })
    }
}
