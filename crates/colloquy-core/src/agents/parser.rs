//! JSON-lines parser for agent output.
//!
//! Agent processes print one [`AgentEvent`] per line; the spawn layer
//! delivers stdout already split into lines.

use super::event::AgentEvent;

/// Parser for newline-delimited agent events.
#[derive(Debug, Default)]
pub struct EventLineParser {
    /// Lines that could not be parsed, kept for diagnostics.
    rejected: usize,
}

impl EventLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single line. Blank lines and non-JSON noise yield `None`.
    pub fn parse_line(&mut self, line: &str) -> Option<AgentEvent> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<AgentEvent>(trimmed) {
            Ok(event) => Some(event),
            Err(e) => {
                self.rejected += 1;
                log::debug!("Ignoring unparseable agent line ({e}): {trimmed}");
                None
            }
        }
    }

    /// Number of lines dropped because they were not valid events.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
