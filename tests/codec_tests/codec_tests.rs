//! Tests for the binary codec
//!
//! These tests verify:
//! - Values survive encode/decode
//! - Malformed payloads surface as Codec errors

use std::collections::HashMap;

use recordkv::codec::{decode, encode};
use recordkv::StoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum Shape {
    Circle { radius: f64 },
    Rect { w: u32, h: u32 },
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Drawing {
    title: String,
    shapes: Vec<Shape>,
    meta: HashMap<String, String>,
}

#[test]
fn test_nested_value() {
    let mut meta = HashMap::new();
    meta.insert("author".to_string(), "sam".to_string());
    let drawing = Drawing {
        title: "plan".to_string(),
        shapes: vec![Shape::Circle { radius: 1.5 }, Shape::Rect { w: 3, h: 4 }],
        meta,
    };

    let bytes = encode(&drawing).unwrap();
    let decoded: Drawing = decode(&bytes).unwrap();

    assert_eq!(decoded, drawing);
}

#[test]
fn test_truncated_payload_is_codec_error() {
    let bytes = encode(&"a fairly long string".to_string()).unwrap();

    let result: Result<String, _> = decode(&bytes[..bytes.len() - 3]);

    assert!(matches!(result, Err(StoreError::Codec(_))));
}

#[test]
fn test_trailing_bytes_are_codec_error() {
    let mut bytes = encode(&7u32).unwrap();
    bytes.push(0);

    let result: Result<u32, _> = decode(&bytes);

    assert!(matches!(result, Err(StoreError::Codec(_))));
}

#[test]
fn test_invalid_enum_tag_is_codec_error() {
    // variant index 9 does not exist
    let bytes = 9u32.to_le_bytes();

    let result: Result<Shape, _> = decode(&bytes);

    assert!(matches!(result, Err(StoreError::Codec(_))));
}
