use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};
use mineclear_core::{RecordStore, Records, StoreError};

/// Record table kept in the browser's `localStorage` under a single key.
#[derive(Clone, Debug)]
pub struct LocalStorageRecordStore {
    key: String,
}

impl LocalStorageRecordStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl RecordStore for LocalStorageRecordStore {
    fn load(&self) -> Records {
        match LocalStorage::get::<Records>(&self.key) {
            Ok(records) => records,
            Err(StorageError::KeyNotFound(_)) => Records::default(),
            Err(err) => {
                log::warn!("Ignoring unreadable records in {:?}: {}", self.key, err);
                Records::default()
            }
        }
    }

    fn save(&mut self, records: &Records) -> Result<(), StoreError> {
        LocalStorage::set(&self.key, records).map_err(|err| StoreError::Backend(err.to_string()))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        LocalStorage::delete(&self.key);
        Ok(())
    }
}
