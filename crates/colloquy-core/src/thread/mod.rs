//! Conversation threads: identity, stored turns, and their display form.

mod id;
mod turn;

pub use id::ThreadId;
pub use turn::{rehydrate, tool_marker, DisplayRole, DisplayTurn, Role, Turn};
