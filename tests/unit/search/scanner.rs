//! Unit tests for algorithm/search/scanner.rs

use std::sync::atomic::AtomicBool;

use segscan::algorithm::search::{build_index, SegmentBuffer, TemplateScanner};
use segscan::common::{sort_records, SegmentRecord};
use segscan::config::SearchConfig;
use segscan::core::{pack, HashingRegion, Index};
use segscan::seed::{HashFunctionFactory, RollingKmerFactory, WindowHashFunction};
use segscan::ScanError;

use crate::helpers::{random_dna, store_of, FailingWriter, MockIndex, RecordingWriter};

fn config(word_size: usize, step_size: usize, num_threads: usize) -> SearchConfig {
    SearchConfig {
        word_size,
        step_size,
        num_threads,
        thread_multiplier: 3,
        ..SearchConfig::default()
    }
}

/// Search reads cut from the build sequences, with a few point changes.
fn fixture() -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let build: Vec<Vec<u8>> = (0..4).map(|i| random_dna(400 + 50 * i, i as u64)).collect();
    let mut search = Vec::new();
    for (i, source) in build.iter().enumerate() {
        for start in [0usize, 90, 210] {
            let mut read = source[start..start + 120].to_vec();
            read[40 + i] = b'N';
            read[80] = if read[80] == b'A' { b'C' } else { b'A' };
            search.push(read);
        }
    }
    search.push(random_dna(300, 99));
    (build, search)
}

fn single_region(
    build: &[Vec<u8>],
    search: &[Vec<u8>],
    config: &SearchConfig,
) -> Vec<SegmentRecord> {
    let build = store_of("b", build);
    let search = store_of("s", search);
    let factory = RollingKmerFactory::new(config.word_size).unwrap();
    let index = build_index(&build, &factory).unwrap();
    let scanner = TemplateScanner::new(&index, &factory, config);
    let mut buffer = SegmentBuffer::new();
    scanner
        .scan_region(&search, HashingRegion::NONE, &mut buffer, &AtomicBool::new(false))
        .unwrap();
    let mut records = buffer.into_records();
    sort_records(&mut records);
    records
}

fn partitioned(
    build: &[Vec<u8>],
    search: &[Vec<u8>],
    config: &SearchConfig,
) -> Vec<SegmentRecord> {
    let build = store_of("b", build);
    let search = store_of("s", search);
    let factory = RollingKmerFactory::new(config.word_size).unwrap();
    let index = build_index(&build, &factory).unwrap();
    let scanner = TemplateScanner::new(&index, &factory, config);
    let buffers = scanner.scan(&search, |_| SegmentBuffer::new()).unwrap();
    let mut records: Vec<SegmentRecord> = buffers
        .into_iter()
        .flat_map(SegmentBuffer::into_records)
        .collect();
    sort_records(&mut records);
    records
}

#[test]
fn test_partitioned_scan_matches_single_region() {
    let (build, search) = fixture();
    for (word_size, step_size) in [(12, 1), (11, 3)] {
        let expected = single_region(&build, &search, &config(word_size, step_size, 1));
        assert!(!expected.is_empty());
        for threads in [1, 2, 4] {
            let actual = partitioned(&build, &search, &config(word_size, step_size, threads));
            assert_eq!(
                actual, expected,
                "word={} step={} threads={}",
                word_size, step_size, threads
            );
        }
    }
}

#[test]
fn test_reads_map_back_to_their_source() {
    let (build, search) = fixture();
    let records = partitioned(&build, &search, &config(12, 1, 2));
    for search_id in 0..12u64 {
        let best = records
            .iter()
            .filter(|r| r.search_id == search_id)
            .max_by_key(|r| r.bins)
            .unwrap();
        assert_eq!(best.build_id as u64, search_id / 3, "{:?}", best);
        assert!(best.bins >= 20, "{:?}", best);
    }
    // the unrelated read finds nothing long
    assert!(records
        .iter()
        .filter(|r| r.search_id == 12)
        .all(|r| r.bins < 20));
}

#[test]
fn test_segments_span_matching_stretches() {
    let build = vec![b"TTTTTTTTACGTTGCATCCG".to_vec()];
    let search = vec![b"GGACGTTGCATCCGGG".to_vec()];
    let records = single_region(&build, &search, &config(6, 2, 1));
    // search windows ending at 7, 9, 11, 13 map to build window ends 13, 15, 17, 19
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!((record.build_start, record.build_end), (8, 20));
    assert_eq!(record.bins, 4);
    assert_eq!(record.search_position, 15);
}

#[test]
fn test_scan_with_mock_index() {
    let factory = RollingKmerFactory::new(4).unwrap();
    let hash = factory.build(HashingRegion::NONE);
    let mut index = MockIndex::default();
    index.add(hash.hash_window(b"ACGT").unwrap(), pack(5, 103));
    index.add(hash.hash_window(b"CGTA").unwrap(), pack(5, 104));
    index.add(hash.hash_window(b"CGTA").unwrap(), pack(2, 50));

    let config = config(4, 1, 1);
    let scanner = TemplateScanner::new(&index, &factory, &config);
    let search = store_of("s", &[b"ACGTA".to_vec()]);
    let mut writer = RecordingWriter::default();
    let stats = scanner
        .scan_region(&search, HashingRegion::NONE, &mut writer, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(stats.hits, 3);
    assert_eq!(stats.extended, 1);
    let written: Vec<(u32, u32, u32)> = writer
        .written
        .iter()
        .map(|w| (w.segment.sequence_id(), w.segment.end(), w.segment.bins()))
        .collect();
    assert_eq!(written, vec![(2, 50, 1), (5, 104, 2)]);
}

#[test]
fn test_writer_failure_aborts_scan() {
    let (build, search) = fixture();
    let build = store_of("b", &build);
    let search = store_of("s", &search);
    let config = config(12, 1, 3);
    let factory = RollingKmerFactory::new(12).unwrap();
    let index = build_index(&build, &factory).unwrap();
    let scanner = TemplateScanner::new(&index, &factory, &config);

    let result = scanner.scan(&search, |_| FailingWriter::new(4));
    assert!(matches!(result, Err(ScanError::Io(_))));
}

#[test]
fn test_empty_search_collection() {
    let build = store_of("b", &[random_dna(50, 1)]);
    let search = store_of("s", &[]);
    let config = config(8, 1, 2);
    let factory = RollingKmerFactory::new(8).unwrap();
    let index = build_index(&build, &factory).unwrap();
    let scanner = TemplateScanner::new(&index, &factory, &config);
    let buffers = scanner.scan(&search, |_| SegmentBuffer::new()).unwrap();
    assert!(buffers.is_empty());
}

#[test]
fn test_collector_capacity_follows_repeat_limit() {
    let build = store_of("b", &[b"AAAAAAAAAAAA".to_vec()]);
    let factory = RollingKmerFactory::new(4).unwrap();
    let index = build_index(&build, &factory).unwrap();
    assert_eq!(index.max_hash_count(), 9);

    let unlimited = config(4, 1, 1);
    let scanner = TemplateScanner::new(&index, &factory, &unlimited);
    assert_eq!(scanner.collector_capacity(), 9);
    let limited = SearchConfig {
        max_hash_count: Some(3),
        ..config(4, 1, 1)
    };
    let scanner = TemplateScanner::new(&index, &factory, &limited);
    assert_eq!(scanner.collector_capacity(), 3);
}

#[test]
fn test_scan_restricted_to_sequence_range() {
    let (build, search) = fixture();
    let build = store_of("b", &build);
    let search = store_of("s", &search);
    let factory = RollingKmerFactory::new(12).unwrap();
    let index = build_index(&build, &factory).unwrap();

    let ranged = config(12, 1, 2)
        .with_sequence_range(Some(3), Some(8))
        .unwrap();
    let scanner = TemplateScanner::new(&index, &factory, &ranged);
    let buffers = scanner.scan(&search, |_| SegmentBuffer::new()).unwrap();
    let mut actual: Vec<SegmentRecord> = buffers
        .into_iter()
        .flat_map(SegmentBuffer::into_records)
        .collect();
    sort_records(&mut actual);

    let mut buffer = SegmentBuffer::new();
    scanner
        .scan_region(
            &search,
            HashingRegion::sequences(3, 8),
            &mut buffer,
            &AtomicBool::new(false),
        )
        .unwrap();
    let mut expected = buffer.into_records();
    sort_records(&mut expected);

    assert!(!actual.is_empty());
    assert!(actual.iter().all(|r| (3..8).contains(&r.search_id)));
    assert_eq!(actual, expected);
    // every read in the range still finds its source
    for search_id in 3..8u64 {
        assert!(actual.iter().any(|r| r.search_id == search_id));
    }
}

#[test]
fn test_open_ended_sequence_range() {
    let (build, search) = fixture();
    let tail_config = config(12, 1, 3)
        .with_sequence_range(Some(10), None)
        .unwrap();
    let records = partitioned(&build, &search, &tail_config);
    let all = partitioned(&build, &search, &config(12, 1, 3));
    let tail: Vec<SegmentRecord> = all.into_iter().filter(|r| r.search_id >= 10).collect();
    assert_eq!(records, tail);
}
