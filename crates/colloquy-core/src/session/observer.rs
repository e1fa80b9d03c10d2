//! Hooks for renderers that want to follow an exchange as it happens.

use serde::Serialize;

use crate::stream::ToolStatus;
use crate::thread::{DisplayTurn, ThreadId};

/// How a submitted message ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeOutcome {
    pub thread_id: ThreadId,

    /// The assistant turn that was appended (possibly empty).
    pub reply: DisplayTurn,

    /// Final state of the tool annotation.
    pub status: ToolStatus,

    /// Set when the agent failed or its stream ended abnormally.
    pub error: Option<String>,
}

impl ExchangeOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Receives incremental display updates during
/// [`submit_message`](super::ConversationSessionManager::submit_message).
///
/// Called synchronously between events; keep implementations quick.
pub trait ExchangeObserver {
    /// The user's message was added to the transcript.
    fn on_user_turn(&mut self, _thread_id: &ThreadId, _turn: &DisplayTurn) {}

    /// A fragment of the answer arrived.
    fn on_text(&mut self, _thread_id: &ThreadId, _fragment: &str) {}

    /// The tool annotation changed.
    fn on_status(&mut self, _thread_id: &ThreadId, _status: &ToolStatus) {}

    /// The exchange is over and the assistant turn was appended.
    fn on_finished(&mut self, _outcome: &ExchangeOutcome) {}
}

impl<T: ExchangeObserver + ?Sized> ExchangeObserver for &mut T {
    fn on_user_turn(&mut self, thread_id: &ThreadId, turn: &DisplayTurn) {
        (**self).on_user_turn(thread_id, turn);
    }

    fn on_text(&mut self, thread_id: &ThreadId, fragment: &str) {
        (**self).on_text(thread_id, fragment);
    }

    fn on_status(&mut self, thread_id: &ThreadId, status: &ToolStatus) {
        (**self).on_status(thread_id, status);
    }

    fn on_finished(&mut self, outcome: &ExchangeOutcome) {
        (**self).on_finished(outcome);
    }
}

/// Forwards every callback to two observers, first `.0` then `.1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: ExchangeObserver, B: ExchangeObserver> ExchangeObserver for Tee<A, B> {
    fn on_user_turn(&mut self, thread_id: &ThreadId, turn: &DisplayTurn) {
        self.0.on_user_turn(thread_id, turn);
        self.1.on_user_turn(thread_id, turn);
    }

    fn on_text(&mut self, thread_id: &ThreadId, fragment: &str) {
        self.0.on_text(thread_id, fragment);
        self.1.on_text(thread_id, fragment);
    }

    fn on_status(&mut self, thread_id: &ThreadId, status: &ToolStatus) {
        self.0.on_status(thread_id, status);
        self.1.on_status(thread_id, status);
    }

    fn on_finished(&mut self, outcome: &ExchangeOutcome) {
        self.0.on_finished(outcome);
        self.1.on_finished(outcome);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExchangeObserver for NoopObserver {}
