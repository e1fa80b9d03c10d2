//! Conversation sessions.
//!
//! A session owns the list of threads a user can see, which one is active,
//! their titles, and the transcript currently on screen. Transcripts
//! themselves live in a [`ThreadStore`](crate::store::ThreadStore).

mod manager;
mod observer;
mod state;
pub mod title;

pub use manager::{ConversationSessionManager, SessionError};
pub use observer::{ExchangeObserver, ExchangeOutcome, NoopObserver, Tee};
pub use state::{Notice, SessionState, SidebarEntry};
