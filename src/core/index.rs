//! Hash index: a multi-map from window hash to stored ids.
//!
//! An index is filled during a build phase, frozen exactly once, and then only
//! queried. Queries visit the stored ids through a [`Finder`] so large buckets never
//! have to be materialised by the caller.

use rustc_hash::FxHashMap;

use crate::error::ScanError;

/// Visitor receiving the ids stored under a hash.
pub trait Finder {
    /// Called once per id. An error stops the enclosing search.
    fn found(&mut self, id: u64) -> Result<(), ScanError>;
}

impl<F> Finder for F
where
    F: FnMut(u64) -> Result<(), ScanError>,
{
    fn found(&mut self, id: u64) -> Result<(), ScanError> {
        self(id)
    }
}

/// Query contract shared by the production index and test doubles.
pub trait Index {
    /// Store `id` under `hash`. Only valid before [`Index::freeze`].
    fn add(&mut self, hash: u64, id: u64);

    /// End the build phase.
    fn freeze(&mut self);

    /// Number of ids stored under `hash`.
    fn count(&self, hash: u64) -> usize;

    /// True if at least one id is stored under `hash`.
    fn contains(&self, hash: u64) -> bool {
        self.count(hash) > 0
    }

    /// Call `finder` once per id stored under `hash`, in a stable order.
    fn search(&self, hash: u64, finder: &mut dyn Finder) -> Result<(), ScanError>;

    /// Largest number of ids stored under a single hash.
    fn max_hash_count(&self) -> usize;
}

/// Build/query state of a [`HashIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Building,
    Frozen,
}

/// `FxHashMap` backed index.
///
/// While building, ids are appended per hash. Freezing packs every bucket into one
/// contiguous id array addressed by `(offset, len)` ranges.
pub struct HashIndex {
    state: IndexState,
    building: FxHashMap<u64, Vec<u64>>,
    ranges: FxHashMap<u64, (usize, usize)>,
    ids: Vec<u64>,
    initial_hashes: u64,
    max_hash_count: usize,
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HashIndex {
    pub fn new() -> Self {
        Self {
            state: IndexState::Building,
            building: FxHashMap::default(),
            ranges: FxHashMap::default(),
            ids: Vec::new(),
            initial_hashes: 0,
            max_hash_count: 0,
        }
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    /// Number of `add` calls made during the build phase.
    pub fn initial_hashes(&self) -> u64 {
        self.initial_hashes
    }

    /// Number of stored `(hash, id)` entries.
    pub fn number_entries(&self) -> usize {
        match self.state {
            IndexState::Building => self.building.values().map(Vec::len).sum(),
            IndexState::Frozen => self.ids.len(),
        }
    }

    /// Number of distinct hashes.
    pub fn number_hashes(&self) -> usize {
        match self.state {
            IndexState::Building => self.building.len(),
            IndexState::Frozen => self.ranges.len(),
        }
    }

    /// Visit every stored `(hash, id)` pair, hashes in ascending order.
    pub fn scan<V>(&self, mut visitor: V) -> Result<(), ScanError>
    where
        V: FnMut(u64, u64) -> Result<(), ScanError>,
    {
        self.assert_frozen();
        let mut hashes: Vec<u64> = self.ranges.keys().copied().collect();
        hashes.sort_unstable();
        for hash in hashes {
            for &id in self.bucket(hash) {
                visitor(hash, id)?;
            }
        }
        Ok(())
    }

    /// One-line summary for logging.
    pub fn info_string(&self) -> String {
        format!(
            "state={:?} hashes={} entries={} initial_hashes={} max_hash_count={}",
            self.state,
            self.number_hashes(),
            self.number_entries(),
            self.initial_hashes,
            self.max_hash_count
        )
    }

    #[inline]
    fn bucket(&self, hash: u64) -> &[u64] {
        match self.ranges.get(&hash) {
            Some(&(offset, len)) => &self.ids[offset..offset + len],
            None => &[],
        }
    }

    #[inline]
    fn assert_frozen(&self) {
        assert!(
            self.state == IndexState::Frozen,
            "index queried before freeze"
        );
    }
}

impl Index for HashIndex {
    fn add(&mut self, hash: u64, id: u64) {
        assert!(
            self.state == IndexState::Building,
            "add called on a frozen index"
        );
        self.initial_hashes += 1;
        self.building.entry(hash).or_default().push(id);
    }

    fn freeze(&mut self) {
        assert!(
            self.state == IndexState::Building,
            "index frozen twice"
        );
        let building = std::mem::take(&mut self.building);
        let total: usize = building.values().map(Vec::len).sum();
        let mut hashes: Vec<u64> = building.keys().copied().collect();
        hashes.sort_unstable();

        let mut ids = Vec::with_capacity(total);
        let mut ranges = FxHashMap::default();
        ranges.reserve(hashes.len());
        let mut max_hash_count = 0;
        for hash in hashes {
            let bucket = &building[&hash];
            ranges.insert(hash, (ids.len(), bucket.len()));
            max_hash_count = max_hash_count.max(bucket.len());
            ids.extend_from_slice(bucket);
        }

        self.ids = ids;
        self.ranges = ranges;
        self.max_hash_count = max_hash_count;
        self.state = IndexState::Frozen;
    }

    fn count(&self, hash: u64) -> usize {
        self.assert_frozen();
        self.ranges.get(&hash).map_or(0, |&(_, len)| len)
    }

    fn search(&self, hash: u64, finder: &mut dyn Finder) -> Result<(), ScanError> {
        self.assert_frozen();
        for &id in self.bucket(hash) {
            finder.found(id)?;
        }
        Ok(())
    }

    fn max_hash_count(&self) -> usize {
        self.assert_frozen();
        self.max_hash_count
    }
}
