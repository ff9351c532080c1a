use anyhow::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::sequence::SequencesReader;

/// Output columns, in order.
pub const COLUMNS: [&str; 7] = [
    "search_id",
    "search_pos",
    "build_id",
    "build_start",
    "build_end",
    "bins",
    "distance",
];

/// One closed segment, as reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRecord {
    /// Search sequence ordinal
    pub search_id: u64,
    /// Search position at which the segment closed
    pub search_position: u32,
    /// Build sequence ordinal
    pub build_id: u32,
    pub build_start: u32,
    /// Exclusive
    pub build_end: u32,
    pub bins: u32,
    /// Gap to the previous segment closed on the same build sequence
    pub distance: Option<i64>,
}

impl SegmentRecord {
    fn sort_key(&self) -> (u64, u32, u32, u32) {
        (
            self.search_id,
            self.search_position,
            self.build_id,
            self.build_start,
        )
    }
}

/// Order records by search id, search position, build id, build start.
///
/// Partitions finish in any order; this makes the output independent of the
/// thread count.
pub fn sort_records(records: &mut [SegmentRecord]) {
    records.sort_by_key(SegmentRecord::sort_key);
}

/// Write records as TSV with sequence names in place of ordinals.
pub fn write_segments_to<W, B, S>(
    writer: &mut W,
    records: &[SegmentRecord],
    build: &B,
    search: &S,
    header: bool,
) -> Result<()>
where
    W: Write + ?Sized,
    B: SequencesReader + ?Sized,
    S: SequencesReader + ?Sized,
{
    if header {
        writeln!(writer, "# {}", COLUMNS.join("\t"))?;
    }
    for record in records {
        let distance = match record.distance {
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            search.name(record.search_id)?,
            record.search_position,
            build.name(record.build_id as u64)?,
            record.build_start,
            record.build_end,
            record.bins,
            distance
        )?;
    }
    Ok(())
}

/// Sort and write records to `out_path`, or stdout when `None`.
pub fn write_segments<B, S>(
    mut records: Vec<SegmentRecord>,
    build: &B,
    search: &S,
    out_path: Option<&PathBuf>,
    header: bool,
) -> Result<()>
where
    B: SequencesReader + ?Sized,
    S: SequencesReader + ?Sized,
{
    sort_records(&mut records);
    let stdout = io::stdout();
    let mut writer: Box<dyn Write> = if let Some(path) = out_path {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(BufWriter::new(stdout.lock()))
    };
    write_segments_to(&mut writer, &records, build, search, header)?;
    writer.flush()?;
    Ok(())
}
