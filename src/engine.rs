//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Bootstrap metadata from the header on open
//! - Place records in free space (first-fit) or at end-of-file
//! - Reclaim space on overwrite/remove (coalescing or tail truncation)
//! - Keep the persisted key index and free-space table in step with memory

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::{Config, SyncStrategy};
use crate::error::{Result, StoreError};
use crate::freespace::FreeSpaceTracker;
use crate::index::KeyIndex;
use crate::storage::{
    footprint, Header, RecordFile, FREE_TABLE_SLOT, HEADER_SIZE, INDEX_SLOT, NO_OFFSET,
};

/// Single-file key → value store
///
/// ## State
/// An `Engine` only exists while the store is open. `close` consumes it, so
/// no operation can run against a closed store. Dropping an engine without
/// calling `close` performs the same shutdown on a best-effort basis.
///
/// ## Write-through
/// Every `put`/`remove` rewrites the key index and free-space table records
/// before returning, so the on-disk metadata always matches the last
/// successful call. Both records are kept at the end of the file; free
/// space is only ever handed to user records.
pub struct Engine<V> {
    /// Engine configuration
    config: Config,

    /// Exclusive handle on the store file
    file: RecordFile,

    /// Where the persisted metadata records currently live
    header: Header,

    /// Key → record offset
    index: KeyIndex,

    /// Reusable byte ranges
    free_space: FreeSpaceTracker,

    /// Metadata changed since the last successful persist
    dirty: bool,

    /// Set once shutdown has run
    closed: bool,

    _value: PhantomData<fn() -> V>,
}

/// Point-in-time summary of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of live keys
    pub keys: usize,
    /// File length in bytes
    pub file_len: u64,
    /// Number of free intervals
    pub free_intervals: usize,
    /// Bytes held in free intervals
    pub free_bytes: u64,
    /// Length of the largest free interval
    pub largest_free: u64,
}

impl<V> Engine<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open/create the store file
    /// 2. Empty file: write `-1` into both header slots, start empty
    /// 3. Otherwise: load the key index and free-space table the header points to
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let mut file = RecordFile::open(&config.path, config.create_dirs)?;

        let (header, index, free_space) = if file.is_empty() {
            file.write_slot(INDEX_SLOT, NO_OFFSET)?;
            file.write_slot(FREE_TABLE_SLOT, NO_OFFSET)?;
            (Header::default(), KeyIndex::new(), FreeSpaceTracker::new())
        } else {
            Self::load_metadata(&mut file)?
        };

        debug!(
            path = %config.path.display(),
            keys = index.len(),
            free_intervals = free_space.len(),
            file_len = file.len(),
            "store opened"
        );

        Ok(Self {
            config,
            file,
            header,
            index,
            free_space,
            dirty: false,
            closed: false,
            _value: PhantomData,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified file path
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// Steps:
    /// 1. Encode the value
    /// 2. Reclaim the old record for `key`, if any
    /// 3. Place the new record (free space first, else end-of-file)
    /// 4. Update and persist the metadata
    pub fn put(&mut self, key: &str, value: &V) -> Result<()> {
        // Encode before touching the old record so a bad value loses nothing
        let payload = codec::encode(value)?;
        if u32::try_from(payload.len()).is_err() {
            return Err(StoreError::InvalidArgument(format!(
                "value for key {:?} encodes to {} bytes, over the u32 record limit",
                key,
                payload.len()
            )));
        }

        self.detach_metadata()?;

        if let Some(old_offset) = self.index.remove(key) {
            self.reclaim(old_offset)?;
        }

        let offset = self.allocate(footprint(payload.len() as u64));
        self.file.write_record(offset, &payload)?;
        self.index.put(key, offset);
        trace!(key, offset, len = payload.len(), "record written");

        self.attach_metadata()?;
        self.sync_if_needed()
    }

    /// Get the value stored under `key`
    ///
    /// Returns `Ok(None)` if the key has no record.
    pub fn get(&mut self, key: &str) -> Result<Option<V>> {
        let offset = match self.index.get(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let payload = self.file.read_record(offset)?;
        codec::decode(&payload).map(Some)
    }
}

impl<V> Engine<V> {
    /// Remove `key` and its record
    ///
    /// Returns `false` if the key had no record.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let offset = match self.index.get(key) {
            Some(offset) => offset,
            None => return Ok(false),
        };

        self.detach_metadata()?;
        self.reclaim(offset)?;
        self.index.remove(key);
        trace!(key, offset, "record removed");

        self.attach_metadata()?;
        self.sync_if_needed()?;
        Ok(true)
    }

    /// Close the store gracefully
    ///
    /// Persists any outstanding metadata and syncs the file.
    pub fn close(mut self) -> Result<()> {
        let result = self.shutdown();
        self.closed = true;
        result
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Check whether `key` has a record
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys()
    }

    /// File offset of the record for `key`
    pub fn offset_of(&self, key: &str) -> Option<u64> {
        self.index.get(key)
    }

    /// Free intervals as `(start, length)` in ascending order
    pub fn free_intervals(&self) -> Vec<(u64, u64)> {
        self.free_space.iter().collect()
    }

    /// Current file length
    pub fn file_len(&self) -> u64 {
        self.file.len()
    }

    /// Path to the store file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Summary of keys and space usage
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.index.len(),
            file_len: self.file.len(),
            free_intervals: self.free_space.len(),
            free_bytes: self.free_space.total_free(),
            largest_free: self.free_space.largest(),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Load the key index and free-space table the header points to
    fn load_metadata(file: &mut RecordFile) -> Result<(Header, KeyIndex, FreeSpaceTracker)> {
        let file_len = file.len();
        if file_len < HEADER_SIZE {
            return Err(StoreError::CorruptStore(format!(
                "file is {} bytes, shorter than the {}-byte header",
                file_len, HEADER_SIZE
            )));
        }

        let index_raw = file.read_slot(INDEX_SLOT)?;
        let free_table_raw = file.read_slot(FREE_TABLE_SLOT)?;
        let header = Header::from_slots(index_raw, free_table_raw, file_len)?;

        let index = match header.index_offset {
            Some(offset) => {
                let payload = read_metadata_record(file, "key index", offset)?;
                KeyIndex::decode(&payload).map_err(|e| {
                    StoreError::CorruptStore(format!("key index at {}: {}", offset, e))
                })?
            }
            None => KeyIndex::new(),
        };

        if let Some((key, offset)) = index
            .iter()
            .find(|&(_, offset)| offset < HEADER_SIZE || offset >= file_len)
        {
            return Err(StoreError::CorruptStore(format!(
                "key {:?} points at {} outside record area [{}, {})",
                key, offset, HEADER_SIZE, file_len
            )));
        }

        let free_space = match header.free_table_offset {
            Some(offset) => {
                let payload = read_metadata_record(file, "free table", offset)?;
                FreeSpaceTracker::decode(&payload)?
            }
            None => FreeSpaceTracker::new(),
        };
        free_space.check_bounds(HEADER_SIZE, file_len)?;

        Ok((header, index, free_space))
    }

    /// Pick an offset for `size` bytes: first free fit, else end-of-file
    fn allocate(&mut self, size: u64) -> u64 {
        match self.free_space.find_space(size) {
            Some(offset) => {
                trace!(offset, size, "reusing free space");
                offset
            }
            None => self.file.len(),
        }
    }

    /// Give back the space of the record at `offset`
    ///
    /// A record at (or within one byte of) the end of the file is truncated
    /// away, together with any free interval that then becomes the tail.
    /// Anything else goes to the free-space tracker.
    fn reclaim(&mut self, offset: u64) -> Result<()> {
        let payload_len = self.file.read_record_len(offset)? as u64;
        let size = footprint(payload_len);
        let end = offset + size;
        let eof = self.file.len();

        if end + 1 >= eof {
            let new_len = self.free_space.take_tail(offset).unwrap_or(offset);
            self.file.truncate(new_len)?;
            trace!(offset, size, new_len, "tail truncated");
        } else {
            self.free_space.release(offset, size);
            trace!(offset, size, "space released");
        }

        Ok(())
    }

    /// Take the persisted metadata records out of the file
    ///
    /// They normally sit at the tail, so this is a truncation. Done before
    /// every mutation so user records never land behind stale metadata.
    fn detach_metadata(&mut self) -> Result<()> {
        self.dirty = true;
        if let Some(old_offset) = self.header.free_table_offset.take() {
            self.reclaim(old_offset)?;
        }
        if let Some(old_offset) = self.header.index_offset.take() {
            self.reclaim(old_offset)?;
        }
        Ok(())
    }

    /// Append the key index, then the free-space table, and point the header at them
    ///
    /// Appending never touches free space, so the encoded table matches the
    /// tracker exactly.
    fn attach_metadata(&mut self) -> Result<()> {
        let payload = self.index.encode()?;
        let offset = self.file.len();
        self.file.write_record(offset, &payload)?;
        self.file.write_slot(INDEX_SLOT, Header::to_slot(Some(offset)))?;
        self.header.index_offset = Some(offset);

        let payload = self.free_space.encode();
        let offset = self.file.len();
        self.file.write_record(offset, &payload)?;
        self.file
            .write_slot(FREE_TABLE_SLOT, Header::to_slot(Some(offset)))?;
        self.header.free_table_offset = Some(offset);

        self.dirty = false;
        Ok(())
    }

    fn sync_if_needed(&mut self) -> Result<()> {
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync()?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.dirty {
            self.detach_metadata()?;
            self.attach_metadata()?;
        }
        self.file.sync()?;

        debug!(
            path = %self.file.path().display(),
            keys = self.index.len(),
            free_intervals = self.free_space.len(),
            file_len = self.file.len(),
            "store closed"
        );
        Ok(())
    }
}

impl<V> Drop for Engine<V> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown() {
            warn!(path = %self.file.path().display(), error = %e, "shutdown on drop failed");
        }
    }
}

impl<V> fmt::Debug for Engine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("path", &self.file.path())
            .field("keys", &self.index.len())
            .field("free_intervals", &self.free_space.len())
            .field("file_len", &self.file.len())
            .finish()
    }
}

/// Read a metadata record during open, reporting short reads as corruption
fn read_metadata_record(file: &mut RecordFile, name: &str, offset: u64) -> Result<Vec<u8>> {
    file.read_record(offset).map_err(|e| match e {
        StoreError::IoFault(msg) => {
            StoreError::CorruptStore(format!("{} at {}: {}", name, offset, msg))
        }
        other => other,
    })
}
