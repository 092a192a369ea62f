//! Free-Space Module
//!
//! Tracks byte ranges left behind by deleted records so they can be reused.
//!
//! ## Responsibilities
//! - Keep an ordered set of non-overlapping `(start, length)` intervals
//! - First-fit allocation with shrink-on-allocate
//! - Coalesce exactly-adjacent intervals on release
//! - Hand back the interval touching end-of-file so it can be truncated away
//!
//! ## Persisted Format
//! ```text
//! ┌──────────────────┬──────────────────┐
//! │ Start (i64 BE)   │ Length (i64 BE)  │  ... repeated per interval,
//! └──────────────────┴──────────────────┘      in ascending start order
//! ```
//!
//! ## Data Structure Choice
//! `BTreeMap<start, length>`:
//! - Ascending iteration gives first-fit order for free
//! - `range(..start).next_back()` finds the left neighbour in O(log n)

mod tracker;

pub use tracker::FreeSpaceTracker;

/// Size of one persisted interval: Start (8) + Length (8) = 16 bytes
pub const INTERVAL_SIZE: usize = 16;
