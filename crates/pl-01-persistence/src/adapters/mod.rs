//! # Adapters Module
//!
//! ## Modules
//!
//! - `storage`: `KeyValueStore` backends and their openers
//! - `lock`: data directory process lock (with the `locking` feature)
//! - `time`: wall clock and a manual clock for tests

#[cfg(feature = "locking")]
pub mod lock;
pub mod storage;
pub mod time;

#[cfg(feature = "locking")]
pub use lock::{DatabaseLock, LockError};
pub use storage::{FileBackedKVStore, FileOpener, InMemoryKVStore, MemoryOpener};
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbOpener, RocksDbStore};
pub use time::{ManualClock, SystemTimeSource};
