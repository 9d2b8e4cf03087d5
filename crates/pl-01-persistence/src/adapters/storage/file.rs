use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "locking")]
use crate::adapters::lock::DatabaseLock;

/// File-backed key-value store for the desktop install.
///
/// Keeps the whole database in memory and rewrites a single data file on
/// every write (temp file + rename), so a crash leaves either the old or the
/// new contents on disk. With the `locking` feature the data directory is
/// held under an exclusive process lock for the lifetime of the store.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    #[cfg(feature = "locking")]
    _lock: DatabaseLock,
}

impl FileBackedKVStore {
    /// Data file name inside the data directory.
    pub const DATA_FILE: &'static str = "farm.db";

    /// Open (or create) the store in `data_dir`.
    ///
    /// # Errors
    ///
    /// - `Locked`: another process holds the directory
    /// - `CorruptionError`: the data file is truncated
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, KVStoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        #[cfg(feature = "locking")]
        let lock = DatabaseLock::acquire(data_dir)?;

        let path = data_dir.join(Self::DATA_FILE);
        let data = if path.exists() {
            let data = Self::load_from_file(&path)?;
            tracing::info!(
                "[pl-01] 💾 Loaded {} keys from {}",
                data.len(),
                path.display()
            );
            data
        } else {
            tracing::info!("[pl-01] 📁 No existing data file at {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            data,
            path,
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Format: repeated [key_len:u32 LE][key][value_len:u32 LE][value].
    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)?.read_to_end(&mut bytes)?;

        let mut data = BTreeMap::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            let key = Self::read_chunk(&bytes, &mut cursor)?;
            let value = Self::read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
        let truncated = || KVStoreError::CorruptionError {
            message: format!("data file truncated at byte {}", *cursor),
        };
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..*cursor + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(truncated)?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let start = *cursor + 4;
        let chunk = bytes.get(start..start + len).ok_or_else(truncated)?.to_vec();
        *cursor = start + len;
        Ok(chunk)
    }

    fn encode(data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }
        bytes
    }

    fn save_to_file(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&Self::encode(data))?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Write `next` to disk, then adopt it. On failure memory is unchanged.
    fn commit(&mut self, next: BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        self.save_to_file(&next)?;
        self.data = next;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        next.insert(key.to_vec(), value.to_vec());
        self.commit(next)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        if !self.data.contains_key(key) {
            return Ok(());
        }
        let mut next = self.data.clone();
        next.remove(key);
        self.commit(next)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    next.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    next.remove(&key);
                }
            }
        }
        self.commit(next)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<ScanResult, KVStoreError> {
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self
            .data
            .range(start.to_vec()..end.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileBackedKVStore::open(dir.path()).unwrap();
            store.put(b"flocks\x00a", b"1").unwrap();
            store
                .atomic_batch_write(vec![
                    BatchOperation::put(b"flocks\x00b".to_vec(), b"2".to_vec()),
                    BatchOperation::delete(b"flocks\x00a".to_vec()),
                ])
                .unwrap();
        }

        let store = FileBackedKVStore::open(dir.path()).unwrap();
        assert_eq!(store.get(b"flocks\x00a").unwrap(), None);
        assert_eq!(store.get(b"flocks\x00b").unwrap(), Some(b"2".to_vec()));
        assert!(!dir.path().join("farm.tmp").exists());
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FileBackedKVStore::DATA_FILE), [9, 0, 0, 0, 1]).unwrap();

        let result = FileBackedKVStore::open(dir.path());
        assert!(matches!(result, Err(KVStoreError::CorruptionError { .. })));
    }

    #[cfg(feature = "locking")]
    #[test]
    fn test_second_open_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let _first = FileBackedKVStore::open(dir.path()).unwrap();

        let second = FileBackedKVStore::open(dir.path());
        assert!(matches!(second, Err(KVStoreError::Locked { .. })));
    }
}
