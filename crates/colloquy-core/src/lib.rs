//! # colloquy-core
//!
//! Conversation sessions over pluggable agents and thread stores.
//!
//! This crate has no UI. Front ends (the `colloquy` console, or anything that
//! subscribes to the [`EventBus`](event_bus::EventBus)) drive a
//! [`ConversationSessionManager`] and draw what it reports.
//!
//! ## Key Concepts
//!
//! - **Thread**: A persisted conversation, identified by a [`ThreadId`]
//! - **Turn**: One stored message (user, assistant or tool)
//! - **AgentEvent**: What an agent emits while answering (tool use, text)
//! - **Session**: The set of threads one user sees and the active transcript

pub mod agents;
pub mod config;
pub mod context;
pub mod event_bus;
pub mod logging;
pub mod paths;
pub mod session;
pub mod spawn;
pub mod store;
pub mod stream;
pub mod thread;

// Re-export commonly used types
pub use agents::{Agent, AgentError, AgentEvent, EventStream};
pub use config::{load_config, ColloquyConfig};
pub use context::{ColloquyContext, ColloquyContextBuilder};
pub use session::{ConversationSessionManager, ExchangeObserver, ExchangeOutcome, SessionError};
pub use store::{StoreError, ThreadStore};
pub use stream::{StreamAssembler, ToolStatus};
pub use thread::{DisplayTurn, ThreadId, Turn};
