//! Free-space tracker implementation
//!
//! BTreeMap-based interval set with first-fit allocation and coalescing.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, BytesMut};

use super::INTERVAL_SIZE;
use crate::error::{Result, StoreError};

/// Ordered set of reusable byte ranges
///
/// ## Invariants
/// - Intervals never overlap
/// - No two intervals touch (`start₁ + length₁ == start₂` is always merged)
/// - No interval has zero length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSpaceTracker {
    /// start → length
    intervals: BTreeMap<u64, u64>,
}

impl FreeSpaceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Find room for `desired` bytes (first-fit)
    ///
    /// Scans intervals in ascending start order and takes the first one that
    /// is large enough. The chosen interval is shrunk from the front, or
    /// removed if it is used up exactly.
    ///
    /// Returns `None` if nothing fits; the caller appends at end-of-file.
    pub fn find_space(&mut self, desired: u64) -> Option<u64> {
        if desired == 0 {
            return None;
        }

        let (start, length) = self
            .intervals
            .iter()
            .find(|(_, length)| **length >= desired)
            .map(|(&start, &length)| (start, length))?;

        self.intervals.remove(&start);
        if length > desired {
            self.intervals.insert(start + desired, length - desired);
        }

        Some(start)
    }

    /// Return `[start, start + length)` to the free set
    ///
    /// Merges with an interval ending exactly at `start` and/or one starting
    /// exactly at `start + length`. The caller must not release a range that
    /// reaches end-of-file; it truncates instead.
    pub fn release(&mut self, start: u64, length: u64) {
        if length == 0 {
            return;
        }
        debug_assert!(
            !self.overlaps(start, length),
            "released range [{}, {}) overlaps free space",
            start,
            start + length
        );

        let mut merged_start = start;
        let mut merged_len = length;

        // Left neighbour
        if let Some((&prev_start, &prev_len)) = self.intervals.range(..start).next_back() {
            if prev_start + prev_len == start {
                self.intervals.remove(&prev_start);
                merged_start = prev_start;
                merged_len += prev_len;
            }
        }

        // Right neighbour
        if let Some(next_len) = self.intervals.remove(&(start + length)) {
            merged_len += next_len;
        }

        self.intervals.insert(merged_start, merged_len);
    }

    /// Remove the interval that ends exactly at `eof`, returning its start
    ///
    /// Used after a tail truncation: the new tail may now be free space, which
    /// must be truncated away rather than tracked.
    pub fn take_tail(&mut self, eof: u64) -> Option<u64> {
        let (&start, &length) = self.intervals.iter().next_back()?;
        if start + length != eof {
            return None;
        }
        self.intervals.remove(&start);
        Some(start)
    }

    /// Check that every interval lies inside `[lower, eof)` without touching `eof`
    pub fn check_bounds(&self, lower: u64, eof: u64) -> Result<()> {
        for (&start, &length) in &self.intervals {
            if start < lower || start + length >= eof {
                return Err(StoreError::CorruptStore(format!(
                    "free interval [{}, {}) outside [{}, {})",
                    start,
                    start + length,
                    lower,
                    eof
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Encode as consecutive 16-byte `(start, length)` pairs
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.intervals.len() * INTERVAL_SIZE);
        for (&start, &length) in &self.intervals {
            buf.put_i64(start as i64);
            buf.put_i64(length as i64);
        }
        buf.to_vec()
    }

    /// Decode the layout written by [`encode`](Self::encode)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % INTERVAL_SIZE != 0 {
            return Err(StoreError::CorruptTable(format!(
                "table length {} is not a multiple of {}",
                bytes.len(),
                INTERVAL_SIZE
            )));
        }

        let mut intervals = BTreeMap::new();
        let mut prev_end: Option<u64> = None;
        let mut buf = bytes;

        while buf.has_remaining() {
            let start = buf.get_i64();
            let length = buf.get_i64();

            if start < 0 || length <= 0 {
                return Err(StoreError::CorruptTable(format!(
                    "invalid interval ({}, {})",
                    start, length
                )));
            }
            let (start, length) = (start as u64, length as u64);

            // Entries are written in ascending order with gaps between them
            if let Some(end) = prev_end {
                if start <= end {
                    return Err(StoreError::CorruptTable(format!(
                        "interval at {} overlaps or touches previous interval ending at {}",
                        start, end
                    )));
                }
            }

            let end = start.checked_add(length).ok_or_else(|| {
                StoreError::CorruptTable(format!("interval ({}, {}) overflows", start, length))
            })?;
            prev_end = Some(end);
            intervals.insert(start, length);
        }

        Ok(Self { intervals })
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Iterate `(start, length)` pairs in ascending start order
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.intervals.iter().map(|(&start, &length)| (start, length))
    }

    /// Number of intervals
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// True if there is no free space
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sum of all interval lengths
    pub fn total_free(&self) -> u64 {
        self.intervals.values().sum()
    }

    /// Length of the largest interval, or 0
    pub fn largest(&self) -> u64 {
        self.intervals.values().copied().max().unwrap_or(0)
    }

    fn overlaps(&self, start: u64, length: u64) -> bool {
        let end = start + length;
        self.intervals
            .range(..end)
            .next_back()
            .map_or(false, |(&s, &l)| s + l > start)
    }
}
