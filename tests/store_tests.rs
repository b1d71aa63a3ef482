//! Store Tests
//!
//! Tests verify:
//! - Basic put/get/delete
//! - KeyNotFound for absent keys
//! - Last write wins
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use tabkv::{MapStore, Store, TabError};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = MapStore::new();
    assert_eq!(store.len(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_put_and_get() {
    let store = MapStore::new();

    store.put("key", "value").unwrap();

    assert_eq!(store.get("key").unwrap(), "value");
}

#[test]
fn test_get_nonexistent_key() {
    let store = MapStore::new();

    match store.get("not found") {
        Err(TabError::KeyNotFound(key)) => assert_eq!(key, "not found"),
        other => panic!("expected KeyNotFound, got {:?}", other),
    }
}

#[test]
fn test_put_overwrites_existing() {
    let store = MapStore::new();

    store.put("key", "value1").unwrap();
    store.put("key", "value2").unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("key").unwrap(), "value2");
}

#[test]
fn test_put_empty_value() {
    let store = MapStore::new();
    store.put("key", "").unwrap();
    assert_eq!(store.get("key").unwrap(), "");
}

#[test]
fn test_repeated_get_is_stable() {
    let store = MapStore::new();
    store.put("key", "value").unwrap();

    for _ in 0..10 {
        assert_eq!(store.get("key").unwrap(), "value");
    }
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_key() {
    let store = MapStore::new();

    store.put("delete me", "value").unwrap();
    assert_eq!(store.get("delete me").unwrap(), "value");

    store.delete("delete me").unwrap();

    assert!(matches!(store.get("delete me"), Err(TabError::KeyNotFound(_))));
    assert!(store.is_empty());
}

#[test]
fn test_delete_absent_key_succeeds() {
    let store = MapStore::new();
    store.delete("never there").unwrap();
}

#[test]
fn test_snapshot_is_sorted() {
    let store = MapStore::new();
    store.put("c", "3").unwrap();
    store.put("a", "1").unwrap();
    store.put("b", "2").unwrap();

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn test_usable_as_trait_object() {
    let store: Arc<dyn Store> = Arc::new(MapStore::new());
    store.put("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap(), "v");
}

// =============================================================================
// Concurrent Access Tests (Basic)
// =============================================================================

#[test]
fn test_concurrent_reads() {
    let store = Arc::new(MapStore::new());
    store.put("key", "value").unwrap();

    let mut handles = vec![];

    for _ in 0..10 {
        let s = Arc::clone(&store);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                assert_eq!(s.get("key").unwrap(), "value");
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writes() {
    let store = Arc::new(MapStore::new());

    let mut handles = vec![];

    for i in 0..10 {
        let s = Arc::clone(&store);
        let handle = thread::spawn(move || {
            for j in 0..10 {
                s.put(&format!("key{}_{}", i, j), &format!("value{}_{}", i, j)).unwrap();
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 100);
}

#[test]
fn test_readers_never_see_torn_state() {
    let store = Arc::new(MapStore::new());
    store.put("key", "even").unwrap();

    let writer = {
        let s = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..1000 {
                let value = if i % 2 == 0 { "odd" } else { "even" };
                s.put("key", value).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let s = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let value = s.get("key").unwrap();
                    assert!(value == "odd" || value == "even");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
