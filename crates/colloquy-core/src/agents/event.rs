//! Events emitted by an agent while it answers one user message.

use serde::{Deserialize, Serialize};

/// Unified event type emitted by agent backends.
///
/// On the wire each event is one JSON object tagged by `kind`:
///
/// ```text
/// {"kind":"tool","tool_name":"search"}
/// {"kind":"text","text":"Hel"}
/// {"kind":"done"}
/// ```
///
/// Kinds this crate does not know about deserialize to [`AgentEvent::Unknown`]
/// and are ignored downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AgentEvent {
    /// A tool invocation began.
    Tool { tool_name: String },

    /// A fragment of the assistant's answer (streaming).
    Text { text: String },

    /// The agent reported a failure; the stream ends abnormally.
    Error { message: String },

    /// Explicit end of stream.
    Done,

    /// Any event kind not listed above.
    #[serde(other)]
    Unknown,
}

impl AgentEvent {
    pub fn tool(tool_name: impl Into<String>) -> Self {
        AgentEvent::Tool {
            tool_name: tool_name.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        AgentEvent::Text { text: text.into() }
    }
}
