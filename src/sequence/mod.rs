//! Sequence collections read by the index build and the partitioned scan.
//!
//! Sequences are addressed by their 0-based ordinal in the input file.

use bio::io::fasta;
use std::path::Path;

use crate::error::ScanError;

/// Read-only access to an ordered sequence collection.
pub trait SequencesReader: Sync {
    fn number_sequences(&self) -> u64;

    /// Residues of sequence `id`.
    fn read(&self, id: u64) -> Result<&[u8], ScanError>;

    /// Name of sequence `id`.
    fn name(&self, id: u64) -> Result<&str, ScanError>;

    fn length(&self, id: u64) -> Result<u64, ScanError> {
        Ok(self.read(id)?.len() as u64)
    }

    /// Lengths of sequences `start..end`.
    fn sequence_lengths(&self, start: u64, end: u64) -> Result<Vec<u64>, ScanError> {
        (start..end).map(|id| self.length(id)).collect()
    }

    /// Total residues in sequences `start..end`.
    fn length_between(&self, start: u64, end: u64) -> Result<u64, ScanError> {
        (start..end).map(|id| self.length(id)).sum()
    }
}

/// In-memory collection.
#[derive(Debug, Default, Clone)]
pub struct SequenceStore {
    names: Vec<String>,
    residues: Vec<Vec<u8>>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every record of a FASTA file. The name is the first word of the header.
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let reader = fasta::Reader::from_file(path.as_ref()).map_err(|e| {
            ScanError::FastaParse(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let mut store = Self::new();
        for record in reader.records() {
            let record = record?;
            store.push(record.id(), record.seq());
        }
        Ok(store)
    }

    pub fn push(&mut self, name: &str, residues: &[u8]) {
        self.names.push(name.to_string());
        self.residues.push(residues.to_vec());
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    fn check(&self, id: u64) -> Result<usize, ScanError> {
        match usize::try_from(id) {
            Ok(i) if i < self.residues.len() => Ok(i),
            _ => Err(ScanError::SequenceOutOfRange {
                id,
                count: self.residues.len() as u64,
            }),
        }
    }
}

impl FromIterator<(String, Vec<u8>)> for SequenceStore {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        let (names, residues) = iter.into_iter().unzip();
        Self { names, residues }
    }
}

impl SequencesReader for SequenceStore {
    fn number_sequences(&self) -> u64 {
        self.residues.len() as u64
    }

    fn read(&self, id: u64) -> Result<&[u8], ScanError> {
        let i = self.check(id)?;
        Ok(&self.residues[i])
    }

    fn name(&self, id: u64) -> Result<&str, ScanError> {
        let i = self.check(id)?;
        Ok(&self.names[i])
    }
}
