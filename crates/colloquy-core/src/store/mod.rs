//! Thread storage.
//!
//! The [`ThreadStore`] holds each thread's transcript. Agents append turns;
//! the session manager only lists threads and reads transcripts back.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryThreadStore`] - in-process, for tests and embedding
//! - [`JsonlThreadStore`] - one append-only JSONL file per thread
//!
//! ```text
//! {dir}/
//! ├── threads.json          # Creation-ordered thread index
//! ├── <thread-id>.jsonl     # One Turn per line
//! └── ...
//! ```

mod jsonl;
mod memory;

use thiserror::Error;

use crate::thread::{ThreadId, Turn};

pub use jsonl::JsonlThreadStore;
pub use memory::MemoryThreadStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Thread not found: {0}")]
    NotFound(ThreadId),

    #[error("Thread id cannot be stored: {0:?}")]
    InvalidThreadId(ThreadId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable transcript storage keyed by thread.
pub trait ThreadStore: Send + Sync {
    /// All known thread ids, in creation order.
    fn list_thread_ids(&self) -> Result<Vec<ThreadId>, StoreError>;

    /// The ordered transcript of a thread.
    ///
    /// Returns [`StoreError::NotFound`] if nothing was ever recorded for it.
    fn get_transcript(&self, thread_id: &ThreadId) -> Result<Vec<Turn>, StoreError>;

    /// Append one turn to a thread, creating the thread on first write.
    fn append_turn(&self, thread_id: &ThreadId, turn: &Turn) -> Result<(), StoreError>;
}

impl<S: ThreadStore + ?Sized> ThreadStore for std::sync::Arc<S> {
    fn list_thread_ids(&self) -> Result<Vec<ThreadId>, StoreError> {
        (**self).list_thread_ids()
    }

    fn get_transcript(&self, thread_id: &ThreadId) -> Result<Vec<Turn>, StoreError> {
        (**self).get_transcript(thread_id)
    }

    fn append_turn(&self, thread_id: &ThreadId, turn: &Turn) -> Result<(), StoreError> {
        (**self).append_turn(thread_id, turn)
    }
}
