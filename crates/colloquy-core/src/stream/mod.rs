//! Live assembly of an assistant reply from agent events.
//!
//! The [`StreamAssembler`] is fed events in arrival order and keeps two
//! outputs current after every event: the accumulated answer text and the
//! [`ToolStatus`] annotation.

mod status;

use serde::Serialize;

use crate::agents::AgentEvent;

pub use status::ToolStatus;

/// What changed after feeding one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreamUpdate {
    /// A fragment was appended to the answer.
    Text { fragment: String },

    /// The tool annotation was opened.
    StatusOpened { status: ToolStatus },

    /// The open tool annotation now names a different tool.
    StatusRelabeled { status: ToolStatus },
}

/// Result of one fully consumed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledReply {
    /// Concatenation of every text fragment, in arrival order.
    pub content: String,

    /// Final state of the tool annotation.
    pub status: ToolStatus,

    /// How many annotations were opened (0 or 1).
    pub annotations_opened: usize,

    /// Error message if the agent reported one.
    pub error: Option<String>,
}

/// Accumulates one assistant reply.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    content: String,
    status: ToolStatus,
    annotations_opened: usize,
    error: Option<String>,
    ended: bool,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns `None` for events that change nothing visible.
    ///
    /// An `Error` event ends the stream; anything fed after it is ignored.
    pub fn feed(&mut self, event: &AgentEvent) -> Option<StreamUpdate> {
        if self.ended {
            return None;
        }
        match event {
            AgentEvent::Text { text } => {
                self.content.push_str(text);
                Some(StreamUpdate::Text {
                    fragment: text.clone(),
                })
            }
            AgentEvent::Tool { tool_name } => {
                if self.status.run(tool_name) {
                    self.annotations_opened += 1;
                    Some(StreamUpdate::StatusOpened {
                        status: self.status.clone(),
                    })
                } else {
                    Some(StreamUpdate::StatusRelabeled {
                        status: self.status.clone(),
                    })
                }
            }
            AgentEvent::Error { message } => {
                self.error = Some(message.clone());
                self.ended = true;
                None
            }
            AgentEvent::Done | AgentEvent::Unknown => None,
        }
    }

    /// Record a failure that did not arrive as an event (e.g. a broken stream).
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// True once the agent reported an error; the rest of the stream is moot.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> &ToolStatus {
        &self.status
    }

    /// Close the annotation and hand back the reply.
    pub fn finish(mut self) -> AssembledReply {
        self.status.finish();
        AssembledReply {
            content: self.content,
            status: self.status,
            annotations_opened: self.annotations_opened,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(events: &[AgentEvent]) -> (Vec<StreamUpdate>, AssembledReply) {
        let mut assembler = StreamAssembler::new();
        let updates = events.iter().filter_map(|e| assembler.feed(e)).collect();
        (updates, assembler.finish())
    }

    #[test]
    fn interleaved_tools_and_text() {
        let (updates, reply) = assemble(&[
            AgentEvent::tool("search"),
            AgentEvent::text("Hel"),
            AgentEvent::tool("search"),
            AgentEvent::text("lo!"),
        ]);

        assert_eq!(reply.content, "Hello!");
        assert_eq!(reply.annotations_opened, 1);
        assert_eq!(
            reply.status,
            ToolStatus::Finished {
                tool_name: "search".to_string()
            }
        );
        assert!(matches!(updates[0], StreamUpdate::StatusOpened { .. }));
        assert!(matches!(updates[2], StreamUpdate::StatusRelabeled { .. }));
    }

    #[test]
    fn annotation_tracks_most_recent_tool() {
        let mut assembler = StreamAssembler::new();
        assembler.feed(&AgentEvent::tool("search"));
        assembler.feed(&AgentEvent::tool("calculator"));

        assert_eq!(
            assembler.status(),
            &ToolStatus::Running {
                tool_name: "calculator".to_string()
            }
        );

        let reply = assembler.finish();
        assert_eq!(reply.annotations_opened, 1);
        assert_eq!(
            reply.status,
            ToolStatus::Finished {
                tool_name: "calculator".to_string()
            }
        );
    }

    #[test]
    fn text_only_leaves_status_idle() {
        let (_, reply) = assemble(&[AgentEvent::text("Just "), AgentEvent::text("text.")]);
        assert_eq!(reply.content, "Just text.");
        assert!(reply.status.is_idle());
        assert_eq!(reply.annotations_opened, 0);
    }

    #[test]
    fn fragments_are_not_deduplicated() {
        let (_, reply) = assemble(&[
            AgentEvent::text("ha"),
            AgentEvent::text("ha"),
            AgentEvent::text(""),
            AgentEvent::text("ha"),
        ]);
        assert_eq!(reply.content, "hahaha");
    }

    #[test]
    fn unknown_and_done_are_ignored() {
        let (updates, reply) = assemble(&[
            AgentEvent::Unknown,
            AgentEvent::text("ok"),
            AgentEvent::Done,
        ]);
        assert_eq!(updates.len(), 1);
        assert_eq!(reply.content, "ok");
        assert!(reply.error.is_none());
    }

    #[test]
    fn error_event_keeps_partial_content() {
        let (_, reply) = assemble(&[
            AgentEvent::text("Parti"),
            AgentEvent::Error {
                message: "rate limited".to_string(),
            },
        ]);
        assert_eq!(reply.content, "Parti");
        assert_eq!(reply.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn nothing_counts_after_error_event() {
        let mut assembler = StreamAssembler::new();
        assembler.feed(&AgentEvent::text("Partial"));
        assert!(!assembler.is_ended());

        assembler.feed(&AgentEvent::Error {
            message: "boom".to_string(),
        });
        assert!(assembler.is_ended());
        assert_eq!(assembler.feed(&AgentEvent::text(" more")), None);
        assert_eq!(assembler.feed(&AgentEvent::tool("search")), None);

        let reply = assembler.finish();
        assert_eq!(reply.content, "Partial");
        assert!(reply.status.is_idle());
        assert_eq!(reply.error.as_deref(), Some("boom"));
    }

    #[test]
    fn fail_records_error() {
        let mut assembler = StreamAssembler::new();
        assembler.feed(&AgentEvent::tool("search"));
        assembler.fail("pipe closed");

        let reply = assembler.finish();
        assert_eq!(reply.error.as_deref(), Some("pipe closed"));
        assert!(matches!(reply.status, ToolStatus::Finished { .. }));
    }

    #[test]
    fn empty_stream() {
        let (updates, reply) = assemble(&[]);
        assert!(updates.is_empty());
        assert_eq!(reply.content, "");
        assert!(reply.status.is_idle());
    }
}
