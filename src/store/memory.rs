//! In-process store for tests

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use serde_json::Value;

use super::{KeyValueStore, Result, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
    /// Number of upcoming reads that fail before reads succeed again
    failing_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, key: &str, value: Value) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), value);
        }
        self
    }

    /// Make the next `count` reads fail
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
        StoreError::Unavailable(format!("memory store lock poisoned: {}", e))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let pending = self.failing_reads.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_reads.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable(format!("read of {} refused", key)));
        }
        let records = self.records.lock().map_err(Self::lock_error)?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let mut records = self.records.lock().map_err(Self::lock_error)?;
        records.insert(key.to_string(), value.clone());
        Ok(())
    }
}
