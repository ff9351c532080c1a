//! Unit tests for algorithm/search/engine.rs

use std::fs;
use std::path::Path;

use segscan::algorithm::search::{run, search_segments, SearchArgs};
use segscan::config::SearchConfig;
use segscan::ScanError;

use crate::helpers::{random_dna, store_of};

fn write_fasta(path: &Path, records: &[(&str, &[u8])]) {
    let mut text = String::new();
    for (name, residues) in records {
        text.push('>');
        text.push_str(name);
        text.push_str(" description\n");
        for line in residues.chunks(60) {
            text.push_str(std::str::from_utf8(line).unwrap());
            text.push('\n');
        }
    }
    fs::write(path, text).unwrap();
}

fn args(build: &Path, search: &Path, out: &Path) -> SearchArgs {
    SearchArgs {
        build: build.to_path_buf(),
        search: search.to_path_buf(),
        word_size: 8,
        step_size: 2,
        num_threads: 2,
        thread_multiplier: 2,
        max_hash_count: 0,
        start: None,
        end: None,
        out: Some(out.to_path_buf()),
        header: true,
        progress: false,
    }
}

#[test]
fn test_run_writes_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let build_path = dir.path().join("build.fa");
    let search_path = dir.path().join("search.fa");
    let out_path = dir.path().join("out.tsv");

    let reference = random_dna(200, 7);
    let read = reference[50..90].to_vec();
    write_fasta(&build_path, &[("ref1", reference.as_slice())]);
    write_fasta(&search_path, &[("read1", read.as_slice())]);

    run(args(&build_path, &search_path, &out_path)).unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "# search_id\tsearch_pos\tbuild_id\tbuild_start\tbuild_end\tbins\tdistance"
    );
    let best = lines[1..]
        .iter()
        .map(|line| line.split('\t').collect::<Vec<_>>())
        .max_by_key(|fields| fields[5].parse::<u32>().unwrap())
        .unwrap();
    // read windows ending at 7, 9, ..., 39
    assert_eq!(best[0], "read1");
    assert_eq!(best[2], "ref1");
    assert_eq!(best[3], "50");
    assert_eq!(best[4], "90");
    assert_eq!(best[5], "17");
    assert_eq!(best[1], "41");
}

#[test]
fn test_run_rejects_bad_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.fa");
    write_fasta(&path, &[("a", &b"ACGTACGTACGT"[..])]);
    let mut bad = args(&path, &path, &dir.path().join("out.tsv"));
    bad.step_size = 9;
    let err = run(bad).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScanError>(),
        Some(ScanError::InvalidConfig(_))
    ));
}

#[test]
fn test_run_rejects_reversed_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.fa");
    write_fasta(&path, &[("a", &b"ACGTACGTACGT"[..])]);
    let mut bad = args(&path, &path, &dir.path().join("out.tsv"));
    bad.start = Some(2);
    bad.end = Some(1);
    let err = run(bad).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScanError>(),
        Some(ScanError::InvalidConfig(_))
    ));
}

#[test]
fn test_run_scans_only_selected_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let build_path = dir.path().join("build.fa");
    let search_path = dir.path().join("search.fa");
    let out_path = dir.path().join("out.tsv");

    let reference = random_dna(200, 7);
    let first = reference[20..60].to_vec();
    let second = reference[100..140].to_vec();
    write_fasta(&build_path, &[("ref1", reference.as_slice())]);
    write_fasta(
        &search_path,
        &[("read1", first.as_slice()), ("read2", second.as_slice())],
    );

    let mut ranged = args(&build_path, &search_path, &out_path);
    ranged.start = Some(1);
    run(ranged).unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    let names: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|line| line.split('\t').next().unwrap())
        .collect();
    assert!(!names.is_empty());
    assert!(names.iter().all(|&name| name == "read2"));
}

#[test]
fn test_run_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.fa");
    let result = run(args(&missing, &missing, &dir.path().join("out.tsv")));
    assert!(result.is_err());
}

#[test]
fn test_self_search_is_deterministic_across_threads() {
    let sequences: Vec<Vec<u8>> = (0..6).map(|i| random_dna(150 + 40 * i, 10 + i as u64)).collect();
    let build = store_of("b", &sequences);
    let search = store_of("s", &sequences);

    let base = SearchConfig {
        word_size: 10,
        step_size: 1,
        ..SearchConfig::default()
    };
    let one = search_segments(&build, &search, &base.clone().with_threads(1), None).unwrap();
    let four = search_segments(&build, &search, &base.with_threads(4), None).unwrap();
    assert_eq!(one, four);

    // every sequence finds itself end to end
    for (i, residues) in sequences.iter().enumerate() {
        assert!(one.iter().any(|r| r.search_id == i as u64
            && r.build_id as usize == i
            && r.build_start == 0
            && r.build_end as usize == residues.len()
            && r.bins as usize == residues.len() - 9));
    }
}

#[test]
fn test_invalid_config_rejected() {
    let build = store_of("b", &[random_dna(20, 1)]);
    let config = SearchConfig {
        word_size: 40,
        ..SearchConfig::default()
    };
    let result = search_segments(&build, &build, &config, None);
    assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
}
