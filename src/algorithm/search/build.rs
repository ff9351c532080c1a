//! Index construction over the build collection.
//!
//! Every complete window of every build sequence is stored under its hash with
//! id `pack(sequence, window_end)`.

use std::time::Instant;

use crate::core::{pack, HashIndex, HashingRegion, Index};
use crate::error::ScanError;
use crate::seed::{HashFunctionFactory, WindowHashFunction};
use crate::sequence::SequencesReader;

/// Hash every window of `reader` into a new index and freeze it.
pub fn build_index<R, F>(reader: &R, factory: &F) -> Result<HashIndex, ScanError>
where
    R: SequencesReader + ?Sized,
    F: HashFunctionFactory,
{
    let mut index = HashIndex::new();
    add_sequences(&mut index, reader, factory)?;
    index.freeze();
    Ok(index)
}

/// Add every window of `reader` to `index` without freezing it.
pub fn add_sequences<I, R, F>(index: &mut I, reader: &R, factory: &F) -> Result<(), ScanError>
where
    I: Index + ?Sized,
    R: SequencesReader + ?Sized,
    F: HashFunctionFactory,
{
    let start = Instant::now();
    let number_sequences = reader.number_sequences();
    let sequence_limit = u32::try_from(number_sequences).map_err(|_| {
        ScanError::InvalidConfig(format!(
            "build collection holds {} sequences, at most {} are supported",
            number_sequences,
            u32::MAX
        ))
    })?;

    let mut hash = factory.build(HashingRegion::NONE);
    let mut windows = 0u64;
    for seq in 0..sequence_limit {
        let residues = reader.read(seq as u64)?;
        if residues.len() > u32::MAX as usize {
            return Err(ScanError::InvalidConfig(format!(
                "build sequence {} is longer than {} residues",
                reader.name(seq as u64)?,
                u32::MAX
            )));
        }
        hash.reset();
        for (pos, &residue) in residues.iter().enumerate() {
            if let Some(h) = hash.hash_step(residue) {
                index.add(h, pack(seq, pos as u32));
                windows += 1;
            }
        }
    }
    log::info!(
        "Indexed {} windows from {} build sequences in {:.3}s",
        windows,
        number_sequences,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
