//! Partitioned scan of the search collection against a frozen index.
//!
//! The search collection is split into residue-balanced regions (see
//! [`plan_partitions`]); each region runs on the rayon pool with its own hash
//! function, segment aggregator and writer. Within a region, search positions are
//! visited in increasing order: every `step_size`-th window end is looked up and its
//! hits are merged into segments on the build collection.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Instant;

use crate::algorithm::common::diagnostics::ScanDiagnostics;
use crate::config::SearchConfig;
use crate::core::{
    plan_partitions, unpack, CollectorStats, HashingRegion, Index, SegmentAggregator,
};
use crate::error::ScanError;
use crate::seed::{HashFunctionFactory, WindowHashFunction};
use crate::sequence::SequencesReader;

use super::writer::RegionWriter;

/// Window counters of one region.
#[derive(Debug, Default, Clone, Copy)]
struct WindowCounts {
    hashed: usize,
    queried: usize,
    repeats: usize,
}

pub struct TemplateScanner<'a, I, F>
where
    I: Index + Sync + ?Sized,
    F: HashFunctionFactory,
{
    index: &'a I,
    factory: &'a F,
    config: &'a SearchConfig,
    diagnostics: Option<&'a ScanDiagnostics>,
}

impl<'a, I, F> TemplateScanner<'a, I, F>
where
    I: Index + Sync + ?Sized,
    F: HashFunctionFactory,
{
    pub fn new(index: &'a I, factory: &'a F, config: &'a SearchConfig) -> Self {
        Self {
            index,
            factory,
            config,
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Option<&'a ScanDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Most hits a single search position can add to a collector.
    pub fn collector_capacity(&self) -> usize {
        let largest = self.index.max_hash_count();
        let capacity = match self.config.max_hash_count {
            Some(limit) => limit.min(largest),
            None => largest,
        };
        capacity.max(1)
    }

    /// Scan one region sequentially, sending closed segments to `writer`.
    ///
    /// Returns `ScanError::Aborted` if `abort` is raised before the next sequence
    /// starts.
    pub fn scan_region<R, W>(
        &self,
        reader: &R,
        region: HashingRegion,
        writer: &mut W,
        abort: &AtomicBool,
    ) -> Result<CollectorStats, ScanError>
    where
        R: SequencesReader + ?Sized,
        W: RegionWriter,
    {
        let word_size = self.config.word_size;
        let step_size = self.config.step_size;
        let repeat_limit = self.config.max_hash_count;
        let mut hash = self.factory.build(region);
        let mut aggregator = SegmentAggregator::new(
            self.collector_capacity(),
            word_size as u32,
            step_size as u32,
        )?;
        let mut counts = WindowCounts::default();

        for seq in region.sequence_range(reader.number_sequences()) {
            if abort.load(AtomicOrdering::Relaxed) {
                return Err(ScanError::Aborted);
            }
            let residues = reader.read(seq)?;
            if residues.len() > u32::MAX as usize {
                return Err(ScanError::InvalidConfig(format!(
                    "search sequence {} is longer than {} residues",
                    reader.name(seq)?,
                    u32::MAX
                )));
            }
            hash.reset();
            writer.begin_sequence(seq);

            let mut last_position = None;
            for pos in region.padded_positions(seq, residues.len()) {
                let window = hash.hash_step(residues[pos]);
                if window.is_some() {
                    counts.hashed += 1;
                }
                if pos + 1 < word_size
                    || (pos + 1 - word_size) % step_size != 0
                    || !region.is_in_range(seq, pos as u64)
                {
                    continue;
                }
                if let Some(h) = window {
                    let count = self.index.count(h);
                    if repeat_limit.map_or(false, |limit| count > limit) {
                        counts.repeats += 1;
                    } else if count > 0 {
                        counts.queried += 1;
                        self.index.search(h, &mut |id: u64| -> Result<(), ScanError> {
                            let (build_seq, build_pos) = unpack(id);
                            aggregator.add(build_seq, build_pos);
                            Ok(())
                        })?;
                    }
                }
                aggregator.end_position(pos as u32, writer)?;
                last_position = Some(pos);
            }
            aggregator.flush(closing_position(last_position, step_size)?, writer)?;
        }

        if let Some(diagnostics) = self.diagnostics {
            diagnostics.record_windows(counts.hashed, counts.queried, counts.repeats);
            diagnostics.record(aggregator.stats());
        }
        Ok(*aggregator.stats())
    }

    /// Partition the search sequences selected by `config.region` and scan every
    /// region on a pool of `config.num_threads` threads.
    ///
    /// `make_writer` is called once per region; the writers are returned in region
    /// order. If any region fails, the scan stops at the next sequence boundary of
    /// every other region and the first failure is returned.
    pub fn scan<R, W, M>(&self, reader: &R, make_writer: M) -> Result<Vec<W>, ScanError>
    where
        R: SequencesReader + ?Sized,
        W: RegionWriter,
        M: Fn(&HashingRegion) -> W + Sync,
    {
        let range = self.config.region.sequence_range(reader.number_sequences());
        let lengths = reader.sequence_lengths(range.start, range.end)?;
        let plan = plan_partitions(
            &lengths,
            range.start,
            self.config.num_threads,
            self.config.thread_multiplier,
        )?;
        log::info!(
            "Scanning sequences {}..{} ({} residues) in {} jobs on {} threads",
            range.start,
            range.end,
            plan.total_residues,
            plan.number_jobs(),
            self.config.num_threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()?;

        let bar = if self.config.show_progress {
            let bar = ProgressBar::new(plan.number_jobs() as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs",
            ) {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let abort = AtomicBool::new(false);
        let first_error: Mutex<Option<ScanError>> = Mutex::new(None);

        let writers: Vec<Option<W>> = pool.install(|| {
            plan.regions
                .par_iter()
                .map(|region| {
                    let start = Instant::now();
                    log::debug!("Thread Search {} Start", region);
                    let mut writer = make_writer(region);
                    match self.scan_region(reader, *region, &mut writer, &abort) {
                        Ok(stats) => {
                            log::debug!(
                                "Thread Search {} Finish {:.3}s hits={} segments={}",
                                region,
                                start.elapsed().as_secs_f64(),
                                stats.hits,
                                stats.closed
                            );
                            bar.inc(1);
                            Some(writer)
                        }
                        Err(ScanError::Aborted) => None,
                        Err(e) => {
                            log::debug!("Thread Search {} Failed: {}", region, e);
                            abort.store(true, AtomicOrdering::Relaxed);
                            if let Ok(mut slot) = first_error.lock() {
                                slot.get_or_insert(e);
                            }
                            None
                        }
                    }
                })
                .collect()
        });
        bar.finish_and_clear();

        let first_error = first_error
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(e) = first_error {
            return Err(e);
        }
        writers.into_iter().collect::<Option<Vec<W>>>().ok_or(ScanError::Aborted)
    }
}

/// Position at which live segments of a finished sequence close: one stride past
/// the last queried position.
fn closing_position(last_position: Option<usize>, step_size: usize) -> Result<u32, ScanError> {
    let closing = last_position.map_or(0, |pos| pos.saturating_add(step_size));
    u32::try_from(closing).map_err(|_| {
        ScanError::InvalidConfig(format!(
            "closing position {} does not fit in 32 bits",
            closing
        ))
    })
}
