//! JSONL-backed thread store.
//!
//! # Files
//!
//! - `threads.json` - thread index in creation order
//! - `{thread_id}.jsonl` - the transcript, one [`Turn`] per line
//!
//! # Design Notes
//!
//! - **Append-only transcripts**: turns are never rewritten
//! - **Atomic index writes**: write to `threads.json.tmp`, then rename
//! - **Self-healing listing**: transcripts missing from the index are still
//!   listed, after the indexed ones

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{StoreError, ThreadStore};
use crate::thread::{ThreadId, Turn};

const INDEX_FILE: &str = "threads.json";

/// The thread index, saved to `threads.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadIndex {
    threads: Vec<ThreadIndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadIndexEntry {
    id: ThreadId,
    created_at: DateTime<Utc>,
}

/// Thread store writing one JSONL transcript per thread under a directory.
pub struct JsonlThreadStore {
    dir: PathBuf,
    /// Serializes index updates and appends within this process.
    write_lock: Mutex<()>,
}

impl JsonlThreadStore {
    /// Open a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Transcript file for a thread. Ids that could leave `dir` are refused.
    fn transcript_path(&self, thread_id: &ThreadId) -> Result<PathBuf, StoreError> {
        if !thread_id.is_path_safe() {
            return Err(StoreError::InvalidThreadId(thread_id.clone()));
        }
        Ok(self.dir.join(format!("{}.jsonl", thread_id)))
    }

    fn load_index(&self) -> Result<ThreadIndex, StoreError> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(ThreadIndex::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_index(&self, index: &ThreadIndex) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let file_path = self.dir.join(INDEX_FILE);
        let temp_path = self.dir.join(format!("{INDEX_FILE}.tmp"));

        let json = serde_json::to_string_pretty(index)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Thread ids that have a transcript file, sorted by name.
    fn scan_transcripts(&self) -> Result<Vec<ThreadId>, StoreError> {
        let mut ids = Vec::new();

        if !self.dir.exists() {
            return Ok(ids);
        }

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "jsonl").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(ThreadId::from(stem));
                }
            }
        }

        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

impl ThreadStore for JsonlThreadStore {
    fn list_thread_ids(&self) -> Result<Vec<ThreadId>, StoreError> {
        let mut ids: Vec<ThreadId> = self
            .load_index()?
            .threads
            .into_iter()
            .map(|entry| entry.id)
            .collect();

        for id in self.scan_transcripts()? {
            if !ids.contains(&id) {
                log::debug!("Thread {id} has a transcript but no index entry");
                ids.push(id);
            }
        }

        Ok(ids)
    }

    fn get_transcript(&self, thread_id: &ThreadId) -> Result<Vec<Turn>, StoreError> {
        let path = self.transcript_path(thread_id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(thread_id.clone()));
        }

        let reader = BufReader::new(fs::File::open(path)?);
        let mut turns = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            turns.push(serde_json::from_str(&line)?);
        }

        Ok(turns)
    }

    fn append_turn(&self, thread_id: &ThreadId, turn: &Turn) -> Result<(), StoreError> {
        let path = self.transcript_path(thread_id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut index = self.load_index()?;
        if !index.threads.iter().any(|entry| &entry.id == thread_id) {
            index.threads.push(ThreadIndexEntry {
                id: thread_id.clone(),
                created_at: Utc::now(),
            });
            self.save_index(&index)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", serde_json::to_string(turn)?)?;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
