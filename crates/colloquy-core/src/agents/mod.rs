//! The agent seam.
//!
//! An [`Agent`] turns one user message into a single-pass stream of
//! [`AgentEvent`]s. Reasoning, tool execution and persisting the resulting
//! turns are the agent's business; this crate only consumes the stream.

pub mod event;
pub mod parser;
pub mod process;

use std::time::Duration;

use thiserror::Error;

use crate::thread::ThreadId;

pub use event::AgentEvent;
pub use parser::EventLineParser;
pub use process::{ProcessAgent, ProcessAgentConfig};

/// Live event sequence for one exchange.
///
/// Single pass: to get another stream, call [`Agent::run`] again.
pub type EventStream = Box<dyn Iterator<Item = Result<AgentEvent, AgentError>> + Send>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Failed to start agent: {0}")]
    Spawn(String),

    #[error("Malformed agent output: {0}")]
    Parse(String),

    #[error("Agent produced no output for {0:?}")]
    Timeout(Duration),

    #[error("Agent exited with code {0}")]
    Exited(i32),
}

/// An external conversational agent.
pub trait Agent {
    /// Start answering `user_text` in the given thread.
    ///
    /// Implementations record the user turn and the resulting tool and
    /// assistant turns in their thread store, once per call.
    fn run(&self, thread_id: &ThreadId, user_text: &str) -> Result<EventStream, AgentError>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn run(&self, thread_id: &ThreadId, user_text: &str) -> Result<EventStream, AgentError> {
        (**self).run(thread_id, user_text)
    }
}

impl<A: Agent + ?Sized> Agent for std::sync::Arc<A> {
    fn run(&self, thread_id: &ThreadId, user_text: &str) -> Result<EventStream, AgentError> {
        (**self).run(thread_id, user_text)
    }
}
