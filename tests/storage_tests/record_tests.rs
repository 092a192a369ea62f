//! Tests for RecordFile
//!
//! These tests verify:
//! - Length-prefixed records at arbitrary offsets
//! - Big-endian on-disk layout
//! - Short reads reported as IoFault
//! - Header slot access and truncation

use std::fs;
use std::path::PathBuf;

use recordkv::storage::{footprint, RecordFile, FREE_TABLE_SLOT, INDEX_SLOT, LEN_PREFIX_SIZE};
use recordkv::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.db");
    (temp_dir, path)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path) = setup_temp_file();

    let file = RecordFile::open(&path, false).unwrap();

    assert!(path.exists());
    assert!(file.is_empty());
    assert_eq!(file.len(), 0);
    assert_eq!(file.path(), path.as_path());
}

#[test]
fn test_open_with_create_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a").join("b").join("records.db");

    let _file = RecordFile::open(&path, true).unwrap();

    assert!(path.exists());
}

#[test]
fn test_open_without_create_dirs_fails_for_missing_parent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("records.db");

    let result = RecordFile::open(&path, false);

    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_open_existing_file_reports_length() {
    let (_temp, path) = setup_temp_file();
    fs::write(&path, [0u8; 42]).unwrap();

    let file = RecordFile::open(&path, false).unwrap();

    assert_eq!(file.len(), 42);
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_write_and_read_record() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(16, b"payload").unwrap();

    assert_eq!(file.len(), 16 + footprint(7));
    assert_eq!(file.read_record(16).unwrap(), b"payload".to_vec());
    assert_eq!(file.read_record_len(16).unwrap(), 7);
}

#[test]
fn test_record_layout_is_big_endian() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, &[0xAB; 3]).unwrap();
    drop(file);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 3, 0xAB, 0xAB, 0xAB]);
}

#[test]
fn test_empty_record() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, &[]).unwrap();

    assert_eq!(file.len(), LEN_PREFIX_SIZE);
    assert!(file.read_record(0).unwrap().is_empty());
}

#[test]
fn test_overwrite_inside_file_keeps_length() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, b"aaaaaaaa").unwrap();
    file.write_record(12, b"bbbb").unwrap();
    let len = file.len();

    file.write_record(0, b"cc").unwrap();

    assert_eq!(file.len(), len);
    assert_eq!(file.read_record(0).unwrap(), b"cc".to_vec());
    assert_eq!(file.read_record(12).unwrap(), b"bbbb".to_vec());
}

#[test]
fn test_read_truncated_record_is_io_fault() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, b"0123456789").unwrap();
    file.truncate(8).unwrap();

    assert!(matches!(file.read_record(0), Err(StoreError::IoFault(_))));
}

#[test]
fn test_read_past_eof_is_io_fault() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, b"abc").unwrap();

    assert!(matches!(file.read_record(100), Err(StoreError::IoFault(_))));
    assert!(matches!(file.read_record_len(5), Err(StoreError::IoFault(_))));
}

// =============================================================================
// Header Slot Tests
// =============================================================================

#[test]
fn test_slots_round_trip() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_slot(INDEX_SLOT, -1).unwrap();
    file.write_slot(FREE_TABLE_SLOT, 1234).unwrap();

    assert_eq!(file.len(), 16);
    assert_eq!(file.read_slot(INDEX_SLOT).unwrap(), -1);
    assert_eq!(file.read_slot(FREE_TABLE_SLOT).unwrap(), 1234);
}

#[test]
fn test_read_slot_on_empty_file_is_io_fault() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    assert!(matches!(file.read_slot(INDEX_SLOT), Err(StoreError::IoFault(_))));
}

// =============================================================================
// Truncate / Sync Tests
// =============================================================================

#[test]
fn test_truncate_updates_length() {
    let (_temp, path) = setup_temp_file();
    let mut file = RecordFile::open(&path, false).unwrap();

    file.write_record(0, &[1; 100]).unwrap();
    file.truncate(20).unwrap();
    file.sync().unwrap();

    assert_eq!(file.len(), 20);
    assert_eq!(fs::metadata(&path).unwrap().len(), 20);
}
