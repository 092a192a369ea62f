//! Store header
//!
//! The first 16 bytes of the file hold the offsets of the persisted key index
//! and free-space table records.

use crate::error::{Result, StoreError};

/// Position of the key index pointer
pub const INDEX_SLOT: u64 = 0;

/// Position of the free-space table pointer
pub const FREE_TABLE_SLOT: u64 = 8;

/// Header size: IndexOffset (8) + FreeTableOffset (8) = 16 bytes
pub const HEADER_SIZE: u64 = 16;

/// Sentinel stored in a slot whose record has not been written yet
pub const NO_OFFSET: i64 = -1;

/// Decoded header pointers for one open session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Offset of the key index record
    pub index_offset: Option<u64>,
    /// Offset of the free-space table record
    pub free_table_offset: Option<u64>,
}

impl Header {
    /// Validate raw slot values against the current file length
    ///
    /// `-1` means the record was never written. Anything else must point
    /// inside the record area of the file.
    pub fn from_slots(index_raw: i64, free_table_raw: i64, file_len: u64) -> Result<Self> {
        Ok(Self {
            index_offset: Self::check_slot("index", index_raw, file_len)?,
            free_table_offset: Self::check_slot("free table", free_table_raw, file_len)?,
        })
    }

    /// Encode an optional offset as a raw slot value
    pub fn to_slot(offset: Option<u64>) -> i64 {
        offset.map(|o| o as i64).unwrap_or(NO_OFFSET)
    }

    fn check_slot(name: &str, raw: i64, file_len: u64) -> Result<Option<u64>> {
        if raw == NO_OFFSET {
            return Ok(None);
        }
        if raw < HEADER_SIZE as i64 || raw as u64 >= file_len {
            return Err(StoreError::CorruptStore(format!(
                "{} pointer {} outside record area [{}, {})",
                name, raw, HEADER_SIZE, file_len
            )));
        }
        Ok(Some(raw as u64))
    }
}
