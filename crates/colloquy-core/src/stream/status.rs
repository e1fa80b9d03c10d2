//! Tool status annotation shown while an answer streams in.

use serde::{Deserialize, Serialize};

/// Lifecycle of the single tool annotation attached to an assistant reply.
///
/// `Idle -> Running -> Finished`. While running, the label always names the
/// most recent tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ToolStatus {
    /// No tool has run in this exchange.
    #[default]
    Idle,

    /// A tool is in progress.
    Running { tool_name: String },

    /// The exchange ended after at least one tool ran.
    Finished { tool_name: String },
}

impl ToolStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, ToolStatus::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ToolStatus::Running { .. })
    }

    /// Text for the annotation, `None` while idle.
    pub fn label(&self) -> Option<String> {
        match self {
            ToolStatus::Idle => None,
            ToolStatus::Running { tool_name } => Some(format!("Using `{tool_name}` …")),
            ToolStatus::Finished { .. } => Some("Tool finished".to_string()),
        }
    }

    /// Point the annotation at `tool_name`. Returns true if this opened it.
    pub(crate) fn run(&mut self, tool_name: &str) -> bool {
        let opened = self.is_idle();
        *self = ToolStatus::Running {
            tool_name: tool_name.to_string(),
        };
        opened
    }

    /// Close the annotation, if one was opened.
    pub(crate) fn finish(&mut self) {
        if let ToolStatus::Running { tool_name } = self {
            *self = ToolStatus::Finished {
                tool_name: std::mem::take(tool_name),
            };
        }
    }
}
