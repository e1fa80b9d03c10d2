//! Persisted turns and their display form.
//!
//! A [`Turn`] is what the thread store holds. A [`DisplayTurn`] is what the
//! renderer draws. Tool turns never reach the screen verbatim: only a marker
//! that a tool ran.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One recorded message in a thread's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,

    /// Message text, or the raw tool payload for tool turns.
    pub content: String,

    /// Name of the tool that ran (tool turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn tool(tool_name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: payload.into(),
            tool_name: Some(tool_name.into()),
        }
    }
}

/// Roles the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayRole {
    User,
    Assistant,
}

/// A message as shown in the chat pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTurn {
    pub role: DisplayRole,
    pub content: String,
}

impl DisplayTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: DisplayRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: DisplayRole::Assistant,
            content: content.into(),
        }
    }

    /// Map a stored turn to its display form.
    pub fn from_turn(turn: &Turn) -> Self {
        match turn.role {
            Role::User => Self::user(turn.content.clone()),
            Role::Assistant => Self::assistant(turn.content.clone()),
            Role::Tool => Self::assistant(tool_marker(turn.tool_name.as_deref())),
        }
    }
}

/// Status line shown in place of a tool payload.
pub fn tool_marker(tool_name: Option<&str>) -> String {
    format!("Tool used: {}", tool_name.unwrap_or("tool"))
}

/// Map a whole transcript, preserving order.
pub fn rehydrate(turns: &[Turn]) -> Vec<DisplayTurn> {
    turns.iter().map(DisplayTurn::from_turn).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mapping {
        use super::*;

        #[test]
        fn user_turn_shown_as_is() {
            let shown = DisplayTurn::from_turn(&Turn::user("hi there"));
            assert_eq!(shown, DisplayTurn::user("hi there"));
        }

        #[test]
        fn assistant_turn_shown_as_is() {
            let shown = DisplayTurn::from_turn(&Turn::assistant("hello"));
            assert_eq!(shown, DisplayTurn::assistant("hello"));
        }

        #[test]
        fn tool_turn_shows_marker_not_payload() {
            let turn = Turn::tool("calculator", "{\"result\": 42}");
            let shown = DisplayTurn::from_turn(&turn);

            assert_eq!(shown.role, DisplayRole::Assistant);
            assert_eq!(shown.content, "Tool used: calculator");
            assert!(!shown.content.contains("42"));
        }

        #[test]
        fn tool_turn_without_name_uses_fallback() {
            let turn = Turn {
                role: Role::Tool,
                content: "payload".to_string(),
                tool_name: None,
            };
            assert_eq!(DisplayTurn::from_turn(&turn).content, "Tool used: tool");
        }

        #[test]
        fn rehydrate_preserves_order() {
            let transcript = vec![
                Turn::user("what is 6*7?"),
                Turn::tool("calculator", "42"),
                Turn::assistant("It is 42."),
            ];

            let shown = rehydrate(&transcript);
            assert_eq!(
                shown,
                vec![
                    DisplayTurn::user("what is 6*7?"),
                    DisplayTurn::assistant("Tool used: calculator"),
                    DisplayTurn::assistant("It is 42."),
                ]
            );
        }

        #[test]
        fn rehydrate_empty_transcript() {
            assert!(rehydrate(&[]).is_empty());
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn role_is_lowercase() {
            let json = serde_json::to_string(&Role::Assistant).unwrap();
            assert_eq!(json, "\"assistant\"");
        }

        #[test]
        fn tool_name_skipped_for_plain_turns() {
            let json = serde_json::to_string(&Turn::user("hi")).unwrap();
            assert!(!json.contains("tool_name"));
        }

        #[test]
        fn tool_turn_roundtrip() {
            let turn = Turn::tool("search", "results");
            let json = serde_json::to_string(&turn).unwrap();
            let parsed: Turn = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, turn);
        }

        #[test]
        fn missing_tool_name_defaults_to_none() {
            let parsed: Turn =
                serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
            assert!(parsed.tool_name.is_none());
        }
    }
}
