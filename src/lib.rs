//! # recordkv
//!
//! A single-file embedded key-value store with:
//! - Length-prefixed records at byte offsets inside one file
//! - First-fit reuse of space left behind by deletions
//! - Coalescing of adjacent free ranges and tail truncation
//! - A persisted key index and free-space table, bootstrapped from a 16-byte header
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Engine<V>                               │
//! │                (put / get / remove / close)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │  KeyIndex   │          │ FreeSpaceTracker │
//!   │ (key→offset)│          │  (first-fit)     │
//!   └──────┬──────┘          └────────┬─────────┘
//!          │                          │
//!          └────────────┬─────────────┘
//!                       ▼
//!               ┌──────────────┐       ┌─────────┐
//!               │  RecordFile  │◄──────│  codec  │
//!               │ (raw records)│       │(bincode)│
//!               └──────────────┘       └─────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use recordkv::Engine;
//!
//! let mut store: Engine<String> = Engine::open_path("data.db")?;
//! store.put("greeting", &"hello".to_string())?;
//! assert_eq!(store.get("greeting")?, Some("hello".to_string()));
//! store.close()?;
//! # Ok::<(), recordkv::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod freespace;
pub mod index;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{Config, SyncStrategy};
pub use engine::{Engine, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of recordkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
