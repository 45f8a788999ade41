use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CellCount, StoreError};

const KEY_PREFIX: &str = "cells_";

/// Fastest completion time in milliseconds per board-size key.
///
/// Stored as a JSON object keyed `cells_<N>`, e.g. `{"cells_81": 40000}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, u64>",
    into = "BTreeMap<String, u64>"
)]
pub struct Records {
    best: BTreeMap<CellCount, u64>,
}

impl Records {
    pub fn best(&self, key: CellCount) -> Option<u64> {
        self.best.get(&key).copied()
    }

    /// Stores `elapsed_ms` if it beats the current record. Ties keep the old record.
    pub fn submit(&mut self, key: CellCount, elapsed_ms: u64) -> bool {
        match self.best.get(&key) {
            Some(&best) if best <= elapsed_ms => false,
            _ => {
                self.best.insert(key, elapsed_ms);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCount, u64)> + '_ {
        self.best.iter().map(|(&key, &ms)| (key, ms))
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Unreadable text yields an empty table; a lost record must not block play.
    pub fn decode(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable records: {}", err);
            Self::default()
        })
    }

    pub fn encode(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<BTreeMap<String, u64>> for Records {
    fn from(raw: BTreeMap<String, u64>) -> Self {
        let mut best = BTreeMap::new();
        for (name, ms) in raw {
            match name
                .strip_prefix(KEY_PREFIX)
                .and_then(|cells| cells.parse::<CellCount>().ok())
            {
                Some(key) => {
                    best.insert(key, ms);
                }
                None => log::warn!("Skipping unknown record key {:?}", name),
            }
        }
        Self { best }
    }
}

impl From<Records> for BTreeMap<String, u64> {
    fn from(records: Records) -> Self {
        records
            .best
            .into_iter()
            .map(|(key, ms)| (format!("{KEY_PREFIX}{key}"), ms))
            .collect()
    }
}

/// Durable home of the record table.
pub trait RecordStore {
    /// Never fails: missing or corrupt data reads as no records.
    fn load(&self) -> Records;

    fn save(&mut self, records: &Records) -> Result<(), StoreError>;

    /// Removes the whole table.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Keeps the encoded table in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordStore {
    raw: Option<String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from already encoded text, which may be garbage.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self) -> Records {
        self.raw.as_deref().map(Records::decode).unwrap_or_default()
    }

    fn save(&mut self, records: &Records) -> Result<(), StoreError> {
        self.raw = Some(records.encode()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.raw = None;
        Ok(())
    }
}

/// Records in a JSON file, for hosts with a filesystem.
#[derive(Clone, Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileRecordStore {
    fn load(&self) -> Records {
        match fs::read_to_string(&self.path) {
            Ok(text) => Records::decode(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Records::default(),
            Err(err) => {
                log::warn!("Could not read records from {}: {}", self.path.display(), err);
                Records::default()
            }
        }
    }

    fn save(&mut self, records: &Records) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, records.encode()?)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
