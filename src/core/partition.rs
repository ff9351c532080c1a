//! Residue-balanced partitioning of a sequence range into scanning jobs.
//!
//! Sequences are packed in id order; a partition is closed as soon as its residue
//! count reaches `total / jobs`. The returned list is the only source for both the
//! job count shown in progress output and the regions that are dispatched.

use crate::error::ScanError;

use super::hashing_region::HashingRegion;

/// Partitions of one sequence range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub regions: Vec<HashingRegion>,
    pub total_residues: u64,
    pub threshold: u64,
}

impl PartitionPlan {
    pub fn number_jobs(&self) -> usize {
        self.regions.len()
    }
}

/// Split sequences `start..start + lengths.len()` into about
/// `number_threads * thread_multiplier` regions of similar residue count.
///
/// `lengths[i]` is the residue count of sequence `start + i`. Every region is
/// non-empty and the regions tile the range in order.
pub fn plan_partitions(
    lengths: &[u64],
    start: u64,
    number_threads: usize,
    thread_multiplier: usize,
) -> Result<PartitionPlan, ScanError> {
    let jobs = number_threads
        .checked_mul(thread_multiplier)
        .filter(|&jobs| jobs > 0)
        .ok_or_else(|| {
            ScanError::InvalidConfig(format!(
                "cannot partition into {} threads x {} jobs",
                number_threads, thread_multiplier
            ))
        })?;

    let total_residues: u64 = lengths.iter().sum();
    let threshold = total_residues / jobs as u64;
    let end = start + lengths.len() as u64;

    let mut regions = Vec::with_capacity(jobs.min(lengths.len()));
    let mut first = start;
    let mut running = 0u64;
    for (id, &len) in (start..end).zip(lengths) {
        running += len;
        if running >= threshold {
            regions.push(HashingRegion::sequences(first, id + 1));
            running = 0;
            first = id + 1;
        }
    }
    if first < end {
        regions.push(HashingRegion::sequences(first, end));
    }

    Ok(PartitionPlan {
        regions,
        total_residues,
        threshold,
    })
}
