//! Search engine core
//!
//! Program independent building blocks of the segment search:
//!
//! - **Regions** (`hashing_region`, `partition`)
//!   - Work descriptors handed to scanning threads
//!   - Residue-balanced partitioning of the search collection
//!
//! - **Index** (`index`)
//!   - Build / freeze / query hash index and the `Finder` visitor
//!
//! - **Segments** (`segment`, `segment_collector`)
//!   - Slab of reusable segments and the per-position merge

pub mod hashing_region;
pub mod index;
pub mod partition;
pub mod segment;
pub mod segment_collector;

pub use hashing_region::HashingRegion;
pub use index::{Finder, HashIndex, Index, IndexState};
pub use partition::{plan_partitions, PartitionPlan};
pub use segment::{Segment, SegmentCollection, SegmentHandle, SegmentPool};
pub use segment_collector::{
    pack, unpack, CollectorStats, SegmentAggregator, SegmentCollector, SegmentWriter,
};
