//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait, and the openers that
//! create them on first use.

mod file;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb_store;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbStore};

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::StoreOpener;
use std::path::PathBuf;

/// Opens a fresh in-memory store.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryOpener;

impl StoreOpener for MemoryOpener {
    type Store = InMemoryKVStore;

    fn open(&self) -> Result<Self::Store, KVStoreError> {
        Ok(InMemoryKVStore::new())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Opens the single-file store in a data directory.
#[derive(Debug, Clone)]
pub struct FileOpener {
    data_dir: PathBuf,
}

impl FileOpener {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl StoreOpener for FileOpener {
    type Store = FileBackedKVStore;

    fn open(&self) -> Result<Self::Store, KVStoreError> {
        FileBackedKVStore::open(&self.data_dir)
    }

    fn describe(&self) -> String {
        self.data_dir.join(FileBackedKVStore::DATA_FILE).display().to_string()
    }
}

#[cfg(feature = "rocksdb")]
#[derive(Debug, Clone)]
pub struct RocksDbOpener {
    config: RocksDbConfig,
}

#[cfg(feature = "rocksdb")]
impl RocksDbOpener {
    pub fn new(config: RocksDbConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "rocksdb")]
impl StoreOpener for RocksDbOpener {
    type Store = RocksDbStore;

    fn open(&self) -> Result<Self::Store, KVStoreError> {
        RocksDbStore::open(self.config.clone())
    }

    fn describe(&self) -> String {
        self.config.path.display().to_string()
    }
}
