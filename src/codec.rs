//! Binary codec
//!
//! Turns values into record payloads and back using bincode.
//!
//! Any type that implements serde's `Serialize` and `DeserializeOwned` can be
//! stored. The key index goes through the same codec; the free-space table
//! has its own fixed-stride layout (see [`crate::freespace`]).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Encode a value to bytes
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Codec(format!("encode failed: {}", e)))
}

/// Decode a value from bytes
///
/// Fails if the bytes are not a complete encoding of `T`, including when
/// there are bytes left over after the value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cursor = bytes;
    let value = bincode::deserialize_from(&mut cursor)
        .map_err(|e| StoreError::Codec(format!("decode failed: {}", e)))?;

    if !cursor.is_empty() {
        return Err(StoreError::Codec(format!(
            "decode failed: {} trailing bytes",
            cursor.len()
        )));
    }

    Ok(value)
}
