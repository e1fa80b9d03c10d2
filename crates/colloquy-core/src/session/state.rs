//! Per-session state.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::title::{derive_title, UNTITLED};
use crate::stream::ToolStatus;
use crate::thread::{DisplayTurn, ThreadId};

/// A failure surfaced to the user instead of being propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Thread that was active when the failure happened.
    pub thread_id: ThreadId,
    pub message: String,
}

/// One row of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub thread_id: ThreadId,
    pub label: String,
    pub active: bool,
}

/// Everything one user session knows about its threads.
///
/// Owned by a single session and never shared. Created at session start,
/// discarded at session end; transcripts themselves live in the thread
/// store.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Thread receiving new messages. Always one of `known_thread_ids`.
    active_thread_id: ThreadId,

    /// Every thread this session can show, oldest first, without duplicates.
    known_thread_ids: Vec<ThreadId>,

    /// Titles derived this session. Threads without one are labelled by id.
    titles: HashMap<ThreadId, String>,

    /// Threads whose title came from a first message; those never change.
    #[serde(skip)]
    titled: HashSet<ThreadId>,

    /// Transcript of the active thread as it should be drawn.
    displayed_turns: Vec<DisplayTurn>,

    /// Tool annotation of the current (or last) exchange.
    live_status: ToolStatus,

    /// Last failure to show the user, until taken.
    notice: Option<Notice>,
}

impl SessionState {
    /// Start a session knowing `seeded` threads, with a fresh active thread.
    pub(crate) fn start(seeded: Vec<ThreadId>, active: ThreadId) -> Self {
        let mut state = Self {
            active_thread_id: active.clone(),
            known_thread_ids: Vec::with_capacity(seeded.len() + 1),
            titles: HashMap::new(),
            titled: HashSet::new(),
            displayed_turns: Vec::new(),
            live_status: ToolStatus::Idle,
            notice: None,
        };
        for id in seeded {
            state.register_thread(id);
        }
        state.begin_thread(active);
        state
    }

    pub fn active_thread_id(&self) -> &ThreadId {
        &self.active_thread_id
    }

    pub fn known_thread_ids(&self) -> &[ThreadId] {
        &self.known_thread_ids
    }

    pub fn is_known(&self, thread_id: &ThreadId) -> bool {
        self.known_thread_ids.contains(thread_id)
    }

    pub fn displayed_turns(&self) -> &[DisplayTurn] {
        &self.displayed_turns
    }

    pub fn live_status(&self) -> &ToolStatus {
        &self.live_status
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn title(&self, thread_id: &ThreadId) -> Option<&str> {
        self.titles.get(thread_id).map(String::as_str)
    }

    /// Sidebar label: the title, or the id for threads titled elsewhere.
    pub fn label(&self, thread_id: &ThreadId) -> String {
        self.title(thread_id)
            .map(str::to_string)
            .unwrap_or_else(|| thread_id.to_string())
    }

    /// Known threads, most recent first.
    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        self.known_thread_ids
            .iter()
            .rev()
            .map(|id| SidebarEntry {
                thread_id: id.clone(),
                label: self.label(id),
                active: id == &self.active_thread_id,
            })
            .collect()
    }

    /// Add a thread if it isn't known yet. Returns true if it was added.
    pub(crate) fn register_thread(&mut self, thread_id: ThreadId) -> bool {
        if self.is_known(&thread_id) {
            return false;
        }
        self.known_thread_ids.push(thread_id);
        true
    }

    /// Register a brand new thread as untitled and switch to it.
    pub(crate) fn begin_thread(&mut self, thread_id: ThreadId) {
        self.register_thread(thread_id.clone());
        self.titles.insert(thread_id.clone(), UNTITLED.to_string());
        self.activate(thread_id, Vec::new());
    }

    /// Make a known thread active with the given transcript.
    pub(crate) fn activate(&mut self, thread_id: ThreadId, turns: Vec<DisplayTurn>) {
        debug_assert!(self.is_known(&thread_id));
        self.active_thread_id = thread_id;
        self.displayed_turns = turns;
        self.live_status = ToolStatus::Idle;
    }

    /// Title a thread from its first message. Returns false if it already was.
    pub(crate) fn title_from_first_message(&mut self, thread_id: &ThreadId, text: &str) -> bool {
        if !self.titled.insert(thread_id.clone()) {
            return false;
        }
        self.titles.insert(thread_id.clone(), derive_title(text));
        true
    }

    pub(crate) fn push_turn(&mut self, turn: DisplayTurn) {
        self.displayed_turns.push(turn);
    }

    pub(crate) fn set_live_status(&mut self, status: ToolStatus) {
        self.live_status = status;
    }

    pub(crate) fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            thread_id: self.active_thread_id.clone(),
            message: message.into(),
        });
    }

    pub(crate) fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
