//! Tests for Engine
//!
//! These tests verify:
//! - Basic get/put/delete through the service boundary
//! - Store mutation happens before the log record is queued
//! - Restart recovery from the transaction log
//! - Dependency injection of the store
//! - Engine lifecycle (open/close)

use std::fs;
use std::sync::Arc;
use std::thread;

use tabkv::config::{Config, SyncStrategy};
use tabkv::engine::Engine;
use tabkv::{LogState, MapStore, Store, TabError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_in(temp_dir: &TempDir) -> Config {
    Config::builder()
        .log_path(temp_dir.path().join("transactions.log"))
        .sync_strategy(SyncStrategy::EveryWrite) // Sync every write for test reliability
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(config_in(&temp_dir)).unwrap();
    (temp_dir, engine)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_open_creates_log_and_parents() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("nested").join("dir").join("tx.log");
    let config = Config::builder().log_path(&log_path).build();

    let engine = Engine::open(config).unwrap();

    assert!(log_path.exists());
    assert_eq!(engine.log_state(), LogState::Running);
    engine.close().unwrap();
}

#[test]
fn test_put_then_get() {
    let (_temp, engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();

    assert_eq!(engine.get("a").unwrap(), "1");
    engine.close().unwrap();
}

#[test]
fn test_get_missing_key() {
    let (_temp, engine) = setup_temp_engine();
    assert!(matches!(engine.get("missing"), Err(TabError::KeyNotFound(_))));
    engine.close().unwrap();
}

#[test]
fn test_delete_then_get() {
    let (_temp, engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    engine.delete("a").unwrap();

    assert!(matches!(engine.get("a"), Err(TabError::KeyNotFound(_))));
    engine.close().unwrap();
}

#[test]
fn test_empty_key_rejected() {
    let (temp, engine) = setup_temp_engine();

    assert!(matches!(engine.put("", "v"), Err(TabError::InvalidKey)));
    assert!(matches!(engine.get(""), Err(TabError::InvalidKey)));
    assert!(matches!(engine.delete(""), Err(TabError::InvalidKey)));
    engine.close().unwrap();

    assert_eq!(fs::read_to_string(temp.path().join("transactions.log")).unwrap(), "");
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .log_path(temp_dir.path().join("tx.log"))
        .queue_capacity(0)
        .build();

    assert!(matches!(Engine::open(config), Err(TabError::Config(_))));
}

#[test]
fn test_mutation_visible_before_close() {
    let (_temp, engine) = setup_temp_engine();

    // The store is updated synchronously even though the append is queued
    engine.put("a", "1").unwrap();
    assert_eq!(engine.store().get("a").unwrap(), "1");
    engine.close().unwrap();
}

#[test]
fn test_store_mutated_even_when_log_closed() {
    let (_temp, engine) = setup_temp_engine();
    engine.close().unwrap();

    // Store first, log second: the write lands in memory, the log refuses it
    assert!(matches!(engine.put("a", "1"), Err(TabError::AlreadyClosed)));
    assert_eq!(engine.get("a").unwrap(), "1");
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_restart_restores_state() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(config_in(&temp_dir)).unwrap();
        engine.put("a", "1").unwrap();
        engine.put("b", "2").unwrap();
        engine.put("a", "3").unwrap();
        engine.delete("b").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(config_in(&temp_dir)).unwrap();
    assert_eq!(engine.get("a").unwrap(), "3");
    assert!(matches!(engine.get("b"), Err(TabError::KeyNotFound(_))));
    assert_eq!(engine.current_sequence(), 4);
    assert_eq!(engine.replay_summary().records, 4);
    engine.close().unwrap();
}

#[test]
fn test_restart_after_many_writers() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Arc::new(Engine::open(config_in(&temp_dir)).unwrap());
        let mut handles = vec![];
        for t in 0..4 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    engine.put(&format!("t{}_{}", t, i), &i.to_string()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        engine.close().unwrap();
    }

    let engine = Engine::open(config_in(&temp_dir)).unwrap();
    assert_eq!(engine.current_sequence(), 100);
    for t in 0..4 {
        for i in 0..25 {
            assert_eq!(engine.get(&format!("t{}_{}", t, i)).unwrap(), i.to_string());
        }
    }
    engine.close().unwrap();
}

#[test]
fn test_corrupt_log_prevents_open() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("transactions.log"), "2\t1\ta\t1\n1\t1\tb\t2\n").unwrap();

    let result = Engine::open(config_in(&temp_dir));
    assert!(matches!(result, Err(TabError::OutOfSequence { .. })));
}

#[test]
fn test_with_injected_store() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(config_in(&temp_dir)).unwrap();
        engine.put("a", "1").unwrap();
        engine.close().unwrap();
    }

    let store = Arc::new(MapStore::new());
    let engine = Engine::with_store(config_in(&temp_dir), store.clone()).unwrap();

    // Replay went into the caller's store
    assert_eq!(store.get("a").unwrap(), "1");
    engine.put("b", "2").unwrap();
    assert_eq!(store.get("b").unwrap(), "2");
    engine.close().unwrap();
}

#[test]
fn test_close_twice() {
    let (_temp, engine) = setup_temp_engine();
    engine.close().unwrap();
    assert_eq!(engine.log_state(), LogState::Closed);
    assert!(matches!(engine.close(), Err(TabError::AlreadyClosed)));
}

#[test]
fn test_no_failures_in_normal_operation() {
    let (_temp, engine) = setup_temp_engine();
    let failures = engine.failures();

    engine.put("a", "1").unwrap();
    assert!(failures.try_recv().is_err());
    engine.close().unwrap();
}
