//! Record File
//!
//! Reads and writes length-prefixed records at absolute offsets.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Size of the big-endian u32 length prefix in front of every payload
pub const LEN_PREFIX_SIZE: u64 = 4;

/// Bytes occupied on disk by a record with a payload of `payload_len` bytes
pub fn footprint(payload_len: u64) -> u64 {
    LEN_PREFIX_SIZE + payload_len
}

/// Exclusive handle on the store file
///
/// Tracks the file length itself so that placement decisions don't need a
/// metadata call per operation.
#[derive(Debug)]
pub struct RecordFile {
    /// Path to the store file
    path: PathBuf,
    /// File handle (read + write)
    file: File,
    /// Current file length in bytes
    len: u64,
}

impl RecordFile {
    /// Open or create the store file
    pub fn open(path: &Path, create_dirs: bool) -> Result<Self> {
        if create_dirs {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    /// Write `payload` as a record starting at `offset`
    ///
    /// The caller guarantees that `[offset, offset + 4 + payload.len())` is
    /// free space or past the end of the file.
    pub fn write_record(&mut self, offset: u64, payload: &[u8]) -> Result<()> {
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            StoreError::InvalidArgument(format!(
                "record payload of {} bytes exceeds the u32 length prefix",
                payload.len()
            ))
        })?;

        let mut buf = Vec::with_capacity(LEN_PREFIX_SIZE as usize + payload.len());
        buf.extend_from_slice(&payload_len.to_be_bytes());
        buf.extend_from_slice(payload);

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&buf)?;

        let end = offset + buf.len() as u64;
        if end > self.len {
            self.len = end;
        }

        Ok(())
    }

    /// Read the payload of the record starting at `offset`
    pub fn read_record(&mut self, offset: u64) -> Result<Vec<u8>> {
        let payload_len = self.read_record_len(offset)? as u64;

        let end = offset + footprint(payload_len);
        if end > self.len {
            return Err(StoreError::IoFault(format!(
                "record at {} declares {} bytes but file ends at {}",
                offset, payload_len, self.len
            )));
        }

        let mut payload = vec![0u8; payload_len as usize];
        self.file
            .read_exact(&mut payload)
            .map_err(|e| short_read(e, offset))?;

        Ok(payload)
    }

    /// Read only the length prefix of the record starting at `offset`
    pub fn read_record_len(&mut self, offset: u64) -> Result<u32> {
        if offset + LEN_PREFIX_SIZE > self.len {
            return Err(StoreError::IoFault(format!(
                "record length at {} lies past end of file ({})",
                offset, self.len
            )));
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let mut prefix = [0u8; LEN_PREFIX_SIZE as usize];
        self.file
            .read_exact(&mut prefix)
            .map_err(|e| short_read(e, offset))?;

        Ok(u32::from_be_bytes(prefix))
    }

    /// Read an 8-byte header slot
    pub fn read_slot(&mut self, pos: u64) -> Result<i64> {
        self.file.seek(SeekFrom::Start(pos))?;
        let mut slot = [0u8; 8];
        self.file
            .read_exact(&mut slot)
            .map_err(|e| short_read(e, pos))?;
        Ok(i64::from_be_bytes(slot))
    }

    /// Write an 8-byte header slot
    pub fn write_slot(&mut self, pos: u64, value: i64) -> Result<()> {
        self.file.seek(SeekFrom::Start(pos))?;
        self.file.write_all(&value.to_be_bytes())?;

        let end = pos + 8;
        if end > self.len {
            self.len = end;
        }
        Ok(())
    }

    /// Shrink (or grow) the file to exactly `new_len` bytes
    pub fn truncate(&mut self, new_len: u64) -> Result<()> {
        self.file.set_len(new_len)?;
        self.len = new_len;
        Ok(())
    }

    /// Flush OS buffers to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Current file length
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True if the file has no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map an unexpected EOF to a short-read fault, keep other I/O errors as is
fn short_read(err: io::Error, offset: u64) -> StoreError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        StoreError::IoFault(format!("short read at offset {}", offset))
    } else {
        StoreError::Io(err)
    }
}
