use anyhow::{Context, Result};
use std::time::Instant;

use crate::algorithm::common::diagnostics::{diagnostics_enabled, ScanDiagnostics};
use crate::common::{sort_records, write_segments, SegmentRecord};
use crate::config::SearchConfig;
use crate::error::ScanError;
use crate::seed::RollingKmerFactory;
use crate::sequence::{SequenceStore, SequencesReader};

use super::args::SearchArgs;
use super::build::build_index;
use super::scanner::TemplateScanner;
use super::writer::SegmentBuffer;

/// Index `build`, scan `search` against it and return every closed segment, sorted.
pub fn search_segments<B, S>(
    build: &B,
    search: &S,
    config: &SearchConfig,
    diagnostics: Option<&ScanDiagnostics>,
) -> Result<Vec<SegmentRecord>, ScanError>
where
    B: SequencesReader + ?Sized,
    S: SequencesReader + ?Sized,
{
    config.validate()?;
    let factory = RollingKmerFactory::new(config.word_size)?;
    let index = build_index(build, &factory)?;
    log::info!("Index: {}", index.info_string());

    let scanner = TemplateScanner::new(&index, &factory, config).with_diagnostics(diagnostics);
    let buffers = scanner.scan(search, |_| SegmentBuffer::new())?;
    let mut records: Vec<SegmentRecord> = buffers
        .into_iter()
        .flat_map(SegmentBuffer::into_records)
        .collect();
    sort_records(&mut records);
    Ok(records)
}

pub fn run(args: SearchArgs) -> Result<()> {
    let start = Instant::now();
    let config = args.to_config().context("Invalid search options")?;
    config.validate().context("Invalid search options")?;

    let build = SequenceStore::from_fasta(&args.build)
        .with_context(|| format!("Failed to read build sequences from {}", args.build.display()))?;
    let search = SequenceStore::from_fasta(&args.search).with_context(|| {
        format!("Failed to read search sequences from {}", args.search.display())
    })?;
    log::info!(
        "Loaded {} build sequences ({} residues), {} search sequences ({} residues)",
        build.len(),
        build.length_between(0, build.number_sequences())?,
        search.len(),
        search.length_between(0, search.number_sequences())?
    );
    if build.is_empty() || search.is_empty() {
        log::warn!("Nothing to search: one of the inputs holds no sequences");
    }

    let diagnostics = diagnostics_enabled().then(ScanDiagnostics::new);
    let records = search_segments(&build, &search, &config, diagnostics.as_ref())
        .context("Search failed")?;
    log::info!(
        "Found {} segments in {:.3}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );

    write_segments(records, &build, &search, args.out.as_ref(), args.header)
        .context("Failed to write segments")?;

    if let Some(diagnostics) = &diagnostics {
        diagnostics.log_summary();
    }
    Ok(())
}
