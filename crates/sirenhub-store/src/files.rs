//! JSON file stores — human-readable, git-friendly.
//!
//! Each query re-reads the file, so edits are picked up without a restart
//! and every dispatch works on its own read-only snapshot. A missing file
//! means an empty roster; a malformed file is a store error and escalates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use sirenhub_core::error::{Result, SirenError};
use sirenhub_core::traits::{ContactStore, DeviceStore};
use sirenhub_core::types::{BuzzerDevice, RecipientContact};

fn load_roster<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| SirenError::Store(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&json)
        .map_err(|e| SirenError::Store(format!("Failed to parse {}: {e}", path.display())))
}

/// Contacts from `contacts.json` in the data directory.
pub struct FileContactStore {
    path: PathBuf,
}

impl FileContactStore {
    pub fn new(data_dir: &Path) -> Self {
        Self { path: data_dir.join("contacts.json") }
    }
}

#[async_trait]
impl ContactStore for FileContactStore {
    async fn list_contacts(&self, institute_id: i64) -> Result<Vec<RecipientContact>> {
        let all: Vec<RecipientContact> = load_roster(&self.path)?;
        Ok(all.into_iter().filter(|c| c.institute_id == institute_id).collect())
    }
}

/// Buzzers from `buzzers.json` in the data directory.
pub struct FileDeviceStore {
    path: PathBuf,
}

impl FileDeviceStore {
    pub fn new(data_dir: &Path) -> Self {
        Self { path: data_dir.join("buzzers.json") }
    }
}

#[async_trait]
impl DeviceStore for FileDeviceStore {
    async fn list_buzzers(&self, institute_id: i64) -> Result<Vec<BuzzerDevice>> {
        let all: Vec<BuzzerDevice> = load_roster(&self.path)?;
        Ok(all.into_iter().filter(|b| b.institute_id == institute_id).collect())
    }
}
