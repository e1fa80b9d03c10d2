//! In-memory thread store.

use std::sync::Mutex;

use super::{StoreError, ThreadStore};
use crate::thread::{ThreadId, Turn};

/// Thread store backed by a mutex-guarded vector of transcripts.
///
/// Keeps creation order, which is all the sidebar needs.
#[derive(Default)]
pub struct MemoryThreadStore {
    threads: Mutex<Vec<(ThreadId, Vec<Turn>)>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with transcripts, in the given order.
    pub fn with_threads(threads: Vec<(ThreadId, Vec<Turn>)>) -> Self {
        Self {
            threads: Mutex::new(threads),
        }
    }
}

impl ThreadStore for MemoryThreadStore {
    fn list_thread_ids(&self) -> Result<Vec<ThreadId>, StoreError> {
        let threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        Ok(threads.iter().map(|(id, _)| id.clone()).collect())
    }

    fn get_transcript(&self, thread_id: &ThreadId) -> Result<Vec<Turn>, StoreError> {
        let threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        threads
            .iter()
            .find(|(id, _)| id == thread_id)
            .map(|(_, turns)| turns.clone())
            .ok_or_else(|| StoreError::NotFound(thread_id.clone()))
    }

    fn append_turn(&self, thread_id: &ThreadId, turn: &Turn) -> Result<(), StoreError> {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        match threads.iter_mut().find(|(id, _)| id == thread_id) {
            Some((_, turns)) => turns.push(turn.clone()),
            None => threads.push((thread_id.clone(), vec![turn.clone()])),
        }
        Ok(())
    }
}
