//! Spool-directory alert source — the outbox side of the trigger.
//!
//! The record-owning application drops one JSON file per lifecycle
//! transition into the spool directory; this source picks each file up
//! exactly once and archives it to `done/` (or `failed/` when it does not
//! parse). Files are consumed in name order, so timestamp-prefixed names
//! give FIFO delivery.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use sirenhub_core::error::Result;
use sirenhub_core::traits::AlertSource;
use sirenhub_core::types::AlertEvent;

/// Watches a directory for `*.json` alert-event files.
pub struct SpoolSource {
    dir: PathBuf,
    poll: Duration,
    buffer: VecDeque<AlertEvent>,
}

impl SpoolSource {
    /// Prepare the spool layout (`<dir>`, `<dir>/done`, `<dir>/failed`).
    pub fn new(dir: &Path, poll: Duration) -> Result<Self> {
        std::fs::create_dir_all(dir.join("done"))?;
        std::fs::create_dir_all(dir.join("failed"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            poll,
            buffer: VecDeque::new(),
        })
    }

    /// One sweep over the spool: parse and archive every pending file,
    /// returning the parsed events in file-name order.
    pub fn scan_once(&self) -> Vec<AlertEvent> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect(),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read spool {}: {e}", self.dir.display());
                return Vec::new();
            }
        };
        entries.sort();

        let mut events = Vec::new();
        for path in entries {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| serde_json::from_str::<AlertEvent>(&json).map_err(|e| e.to_string()))
            {
                Ok(event) => {
                    self.archive(&path, "done");
                    events.push(event);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Unreadable spool file {}: {e}", path.display());
                    self.archive(&path, "failed");
                }
            }
        }
        events
    }

    fn archive(&self, path: &Path, bucket: &str) {
        let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        let target = self.dir.join(bucket).join(name);
        if let Err(e) = std::fs::rename(path, &target) {
            tracing::warn!("⚠️ Failed to archive {} to {bucket}/: {e}", path.display());
        }
    }
}

#[async_trait]
impl AlertSource for SpoolSource {
    async fn recv(&mut self) -> Option<AlertEvent> {
        loop {
            if let Some(event) = self.buffer.pop_front() {
                return Some(event);
            }
            let fresh = self.scan_once();
            self.buffer.extend(fresh);
            if self.buffer.is_empty() {
                tokio::time::sleep(self.poll).await;
            }
        }
    }
}
