//! Tests for KeyIndex
//!
//! These tests verify:
//! - put/get/remove semantics
//! - Sorted key iteration
//! - Persistence through the codec

use recordkv::index::KeyIndex;
use recordkv::StoreError;

#[test]
fn test_put_get() {
    let mut index = KeyIndex::new();

    assert_eq!(index.put("a", 16), None);
    assert_eq!(index.get("a"), Some(16));
    assert!(index.contains_key("a"));
    assert_eq!(index.get("b"), None);
}

#[test]
fn test_put_returns_previous_offset() {
    let mut index = KeyIndex::new();

    index.put("a", 16);
    assert_eq!(index.put("a", 64), Some(16));
    assert_eq!(index.get("a"), Some(64));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_remove() {
    let mut index = KeyIndex::new();
    index.put("a", 16);

    assert_eq!(index.remove("a"), Some(16));
    assert_eq!(index.remove("a"), None);
    assert!(index.is_empty());
}

#[test]
fn test_keys_are_sorted() {
    let mut index = KeyIndex::new();
    index.put("zebra", 100);
    index.put("apple", 16);
    index.put("mango", 50);

    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["apple", "mango", "zebra"]);
    assert_eq!(
        index.iter().collect::<Vec<_>>(),
        vec![("apple", 16), ("mango", 50), ("zebra", 100)]
    );
}

#[test]
fn test_encode_decode() {
    let mut index = KeyIndex::new();
    index.put("alpha", 16);
    index.put("beta", 4096);

    let decoded = KeyIndex::decode(&index.encode().unwrap()).unwrap();

    assert_eq!(decoded, index);
}

#[test]
fn test_encoding_is_deterministic() {
    let mut first = KeyIndex::new();
    first.put("b", 2);
    first.put("a", 1);

    let mut second = KeyIndex::new();
    second.put("a", 1);
    second.put("b", 2);

    assert_eq!(first.encode().unwrap(), second.encode().unwrap());
}

#[test]
fn test_decode_garbage_is_codec_error() {
    let result = KeyIndex::decode(&[0xFF, 0x01]);

    assert!(matches!(result, Err(StoreError::Codec(_))));
}
