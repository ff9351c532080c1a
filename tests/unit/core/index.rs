//! Unit tests for core/index.rs

use segscan::core::{HashIndex, Index, IndexState};
use segscan::ScanError;

use crate::helpers::MockIndex;

fn frozen(entries: &[(u64, u64)]) -> HashIndex {
    let mut index = HashIndex::new();
    for &(hash, id) in entries {
        index.add(hash, id);
    }
    index.freeze();
    index
}

fn collect(index: &dyn Index, hash: u64) -> Vec<u64> {
    let mut ids = Vec::new();
    index
        .search(hash, &mut |id: u64| -> Result<(), ScanError> {
            ids.push(id);
            Ok(())
        })
        .unwrap();
    ids
}

#[test]
fn test_used_through_trait_object() {
    let index = frozen(&[(1, 10), (2, 20), (1, 11)]);
    let dynamic: &dyn Index = &index;
    assert_eq!(dynamic.count(1), 2);
    assert!(dynamic.contains(2));
    assert_eq!(collect(dynamic, 1), vec![10, 11]);
    assert!(collect(dynamic, 42).is_empty());
}

#[test]
fn test_empty_index() {
    let index = frozen(&[]);
    assert_eq!(index.state(), IndexState::Frozen);
    assert_eq!(index.max_hash_count(), 0);
    assert_eq!(index.number_entries(), 0);
    assert!(!index.contains(0));
}

#[test]
fn test_introspection_while_building() {
    let mut index = HashIndex::new();
    index.add(3, 1);
    index.add(3, 2);
    index.add(4, 1);
    assert_eq!(index.state(), IndexState::Building);
    assert_eq!(index.number_hashes(), 2);
    assert_eq!(index.number_entries(), 3);
    index.freeze();
    assert_eq!(index.number_entries(), 3);
    assert!(index.info_string().contains("hashes=2"));
}

#[test]
#[should_panic(expected = "index frozen twice")]
fn test_double_freeze_panics() {
    let mut index = frozen(&[]);
    index.freeze();
}

#[test]
#[should_panic(expected = "index queried before freeze")]
fn test_search_before_freeze_panics() {
    let index = HashIndex::new();
    collect(&index, 1);
}

#[test]
fn test_mock_index_relaxes_state() {
    let mut index = MockIndex::default();
    index.add(4, 40);
    assert_eq!(index.count(4), 1);
    assert_eq!(collect(&index, 4), vec![40]);
    index.freeze();
    index.freeze();
    assert_eq!(index.times_frozen, 2);
}
