//! ConversationSessionManager - thread bookkeeping and live exchanges.

use thiserror::Error;

use super::observer::{ExchangeObserver, ExchangeOutcome};
use super::state::{Notice, SessionState, SidebarEntry};
use crate::agents::Agent;
use crate::store::{StoreError, ThreadStore};
use crate::stream::{StreamAssembler, StreamUpdate, ToolStatus};
use crate::thread::{rehydrate, DisplayTurn, ThreadId, Turn};

/// Misuse of the session API. These are programming errors, not runtime
/// failures; agent and store failures surface as a [`Notice`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot submit an empty message")]
    EmptyMessage,

    #[error("Thread is not known to this session: {0}")]
    UnknownThread(ThreadId),
}

/// Drives one user session: new chats, switching threads, and turning an
/// agent's event stream into a displayed assistant reply.
///
/// One action is processed to completion before the next is accepted, which
/// `&mut self` enforces.
pub struct ConversationSessionManager<S, A> {
    store: S,
    agent: A,
    state: SessionState,
}

impl<S: ThreadStore, A: Agent> ConversationSessionManager<S, A> {
    /// Start a session: seed known threads from the store and open a fresh
    /// thread to type into.
    pub fn new(store: S, agent: A) -> Self {
        let seeded = store.list_thread_ids().unwrap_or_else(|e| {
            log::warn!("Could not list stored threads: {e}");
            Vec::new()
        });
        log::info!("Session started with {} stored threads", seeded.len());

        let state = SessionState::start(seeded, ThreadId::new());
        Self {
            store,
            agent,
            state,
        }
    }

    /// Open a new, empty, untitled thread and make it active.
    ///
    /// Nothing is written to the store; the thread is persisted once the
    /// agent records its first turn.
    pub fn start_new_thread(&mut self) -> ThreadId {
        let thread_id = ThreadId::new();
        self.state.begin_thread(thread_id.clone());
        log::info!("Started thread {thread_id}");
        thread_id
    }

    /// Switch to a known thread, replacing the displayed transcript with the
    /// stored one.
    ///
    /// A thread with nothing stored yet shows as empty. Other store failures
    /// also show an empty transcript and leave a notice.
    pub fn select_thread(&mut self, thread_id: &ThreadId) -> Result<(), SessionError> {
        if !self.state.is_known(thread_id) {
            return Err(SessionError::UnknownThread(thread_id.clone()));
        }

        let (turns, failure) = match self.store.get_transcript(thread_id) {
            Ok(turns) => (turns, None),
            Err(StoreError::NotFound(_)) => (Vec::new(), None),
            Err(e) => {
                log::warn!("Failed to load thread {thread_id}: {e}");
                (Vec::new(), Some(format!("Could not load conversation: {e}")))
            }
        };

        log::debug!("Selected thread {thread_id} ({} turns)", turns.len());
        self.state.activate(thread_id.clone(), rehydrate(&turns));
        if let Some(message) = failure {
            self.state.set_notice(message);
        }
        Ok(())
    }

    /// Send a user message to the agent in the active thread and stream the
    /// reply into the transcript.
    ///
    /// The user turn is shown before the agent is called. Whatever happens
    /// afterwards, exactly one assistant turn is appended, holding whatever
    /// text arrived; failures are reported in the outcome and as a notice.
    pub fn submit_message(
        &mut self,
        text: &str,
        observer: &mut dyn ExchangeObserver,
    ) -> Result<ExchangeOutcome, SessionError> {
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let thread_id = self.state.active_thread_id().clone();
        let is_first_message = self.state.displayed_turns().is_empty();

        let user_turn = DisplayTurn::user(text);
        self.state.push_turn(user_turn.clone());
        observer.on_user_turn(&thread_id, &user_turn);

        if is_first_message && self.state.title_from_first_message(&thread_id, text) {
            log::debug!(
                "Titled thread {thread_id}: {}",
                self.state.label(&thread_id)
            );
        }

        self.state.set_live_status(ToolStatus::Idle);
        let mut assembler = StreamAssembler::new();

        match self.agent.run(&thread_id, text) {
            Ok(stream) => {
                for item in stream {
                    let event = match item {
                        Ok(event) => event,
                        Err(e) => {
                            assembler.fail(e.to_string());
                            break;
                        }
                    };
                    log::debug!("Agent event for {thread_id}: {event:?}");

                    match assembler.feed(&event) {
                        Some(StreamUpdate::Text { fragment }) => {
                            observer.on_text(&thread_id, &fragment);
                        }
                        Some(
                            StreamUpdate::StatusOpened { status }
                            | StreamUpdate::StatusRelabeled { status },
                        ) => {
                            observer.on_status(&thread_id, &status);
                            self.state.set_live_status(status);
                        }
                        None => {}
                    }
                    if assembler.is_ended() {
                        break;
                    }
                }
            }
            Err(e) => assembler.fail(e.to_string()),
        }

        let reply = assembler.finish();
        if !reply.status.is_idle() {
            observer.on_status(&thread_id, &reply.status);
        }
        self.state.set_live_status(reply.status.clone());

        let reply_turn = DisplayTurn::assistant(reply.content);
        self.state.push_turn(reply_turn.clone());

        if let Some(error) = &reply.error {
            log::warn!("Exchange in thread {thread_id} ended with an error: {error}");
            self.state.set_notice(error.clone());
        }

        let outcome = ExchangeOutcome {
            thread_id,
            reply: reply_turn,
            status: reply.status,
            error: reply.error,
        };
        observer.on_finished(&outcome);
        Ok(outcome)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active_thread_id(&self) -> &ThreadId {
        self.state.active_thread_id()
    }

    pub fn displayed_turns(&self) -> &[DisplayTurn] {
        self.state.displayed_turns()
    }

    pub fn title(&self, thread_id: &ThreadId) -> Option<&str> {
        self.state.title(thread_id)
    }

    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        self.state.sidebar()
    }

    /// Take the pending notice, if any, so it's shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.state.take_notice()
    }

    /// Raw stored transcript of a thread, for renderers that need more than
    /// the display form.
    pub fn transcript(&self, thread_id: &ThreadId) -> Result<Vec<Turn>, StoreError> {
        self.store.get_transcript(thread_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }
}
