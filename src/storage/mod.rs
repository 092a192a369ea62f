//! Storage Module
//!
//! Raw record I/O over a single store file.
//!
//! ## Responsibilities
//! - Own the file handle and track the file length
//! - Read/write length-prefixed records at absolute offsets
//! - Read/write the two bootstrap pointers in the header
//! - Truncate the file when tail space is reclaimed
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (16 bytes)                      │
//! │ ┌───────────────────┬────────────────┐ │
//! │ │ Index Offset (8)  │ Free Table (8) │ │
//! │ └───────────────────┴────────────────┘ │
//! │   (i64 BE, -1 = not written yet)       │
//! ├────────────────────────────────────────┤
//! │ Records / free ranges                  │
//! │ ┌──────────┬───────────────────────┐   │
//! │ │ Len (4)  │   Payload (Len bytes) │   │
//! │ └──────────┴───────────────────────┘   │
//! │ ... (records, holes, records ...)      │
//! └────────────────────────────────────────┘
//! ```

mod header;
mod record;

pub use header::{Header, FREE_TABLE_SLOT, HEADER_SIZE, INDEX_SLOT, NO_OFFSET};
pub use record::{footprint, RecordFile, LEN_PREFIX_SIZE};
