//! Unit tests for block_store.rs

use crate::error::Error;
use crate::program::BlockDataStore;

#[test]
fn test_new_store_is_zeroed() {
    let store = BlockDataStore::new(16);
    assert_eq!(store.len(), 16);
    assert!(!store.is_empty());
    assert!(store.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn test_empty_store() {
    let store = BlockDataStore::new(0);
    assert!(store.is_empty());
    assert_eq!(store.region(0, 0), Some(&[][..]));
    assert_eq!(store.region(0, 1), None);
}

#[test]
fn test_write_touches_only_target_range() {
    let mut store = BlockDataStore::new(8);
    store.write(2, &[1, 2, 3]).unwrap();
    assert_eq!(store.as_bytes(), &[0, 0, 1, 2, 3, 0, 0, 0]);
    assert_eq!(store.region(2, 3), Some(&[1, 2, 3][..]));
}

#[test]
fn test_write_at_end() {
    let mut store = BlockDataStore::new(4);
    store.write(2, &[7, 7]).unwrap();
    assert_eq!(store.region(0, 4), Some(&[0, 0, 7, 7][..]));
}

#[test]
fn test_out_of_bounds_write_leaves_store_untouched() {
    let mut store = BlockDataStore::new(4);
    store.write(0, &[5, 5, 5, 5]).unwrap();

    let err = store.write(3, &[1, 1]).unwrap_err();
    assert_eq!(err, Error::OutOfBounds { offset: 3, len: 2, capacity: 4 });
    assert_eq!(store.as_bytes(), &[5, 5, 5, 5]);
}

#[test]
fn test_overflowing_offset_is_rejected() {
    let mut store = BlockDataStore::new(4);
    assert!(store.write(usize::MAX, &[1]).is_err());
    assert_eq!(store.region(usize::MAX, 2), None);
}
