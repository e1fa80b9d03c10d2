//! Thread titles derived from the first message.

/// Title given to a thread before its first message.
pub const UNTITLED: &str = "Untitled Chat";

/// Longest title, in characters, before truncation kicks in.
pub const TITLE_MAX_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// Derive a sidebar title from a thread's first user message.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_unchanged() {
        let text = "Plan a trip to Oslo!";
        assert_eq!(text.chars().count(), 20);
        assert_eq!(derive_title(text), text);
    }

    #[test]
    fn long_text_truncated_with_ellipsis() {
        let text = "Summarize the attached report, pls";
        let text = format!("{text}!");
        assert_eq!(text.chars().count(), 35);

        let title = derive_title(&text);
        assert_eq!(title, "Summarize the attached report,...");
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn exactly_thirty_chars_not_truncated() {
        let text = "a".repeat(30);
        assert_eq!(derive_title(&text), text);
    }

    #[test]
    fn thirty_one_chars_truncated() {
        let text = "b".repeat(31);
        assert_eq!(derive_title(&text), format!("{}...", "b".repeat(30)));
    }

    #[test]
    fn multibyte_text_cut_on_char_boundary() {
        let text = "é".repeat(40);
        assert_eq!(derive_title(&text), format!("{}...", "é".repeat(30)));
    }
}
