//! Key/value persistence for the two records the daemon keeps
//!
//! Records are opaque JSON values keyed by name (`timerState`, `options`).

pub mod file;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use serde_json::Value;
use thiserror::Error;

pub use file::FileStore;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;

pub const TIMER_STATE_KEY: &str = "timerState";
pub const OPTIONS_KEY: &str = "options";

/// Errors that can occur while reading or writing records
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read/write record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Storage backend for named JSON records
pub trait KeyValueStore: Send + Sync {
    /// Read a record; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace a record wholesale
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}
