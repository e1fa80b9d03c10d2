//! Drawing sessions on a plain terminal.

use std::io::{self, Write};

use colloquy_core::session::{ExchangeObserver, ExchangeOutcome, Notice, SidebarEntry};
use colloquy_core::stream::ToolStatus;
use colloquy_core::thread::{DisplayRole, DisplayTurn, ThreadId};

/// Streams an exchange to a writer as it happens.
///
/// Fragments are written as they arrive; tool status goes on its own
/// bracketed line.
pub struct TerminalRenderer<W: Write> {
    out: W,
    at_line_start: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_line_start: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            log::debug!("Terminal write failed: {e}");
        }
        self.at_line_start = text.ends_with('\n');
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            self.write("\n");
        }
    }
}

impl<W: Write> ExchangeObserver for TerminalRenderer<W> {
    fn on_text(&mut self, _thread_id: &ThreadId, fragment: &str) {
        self.write(fragment);
    }

    fn on_status(&mut self, _thread_id: &ThreadId, status: &ToolStatus) {
        if let Some(label) = status.label() {
            self.end_line();
            self.write(&format!("[{label}]\n"));
        }
    }

    fn on_finished(&mut self, outcome: &ExchangeOutcome) {
        self.end_line();
        if let Some(error) = &outcome.error {
            self.write(&format!("! {error}\n"));
        }
    }
}

fn speaker(role: DisplayRole) -> &'static str {
    match role {
        DisplayRole::User => "you",
        DisplayRole::Assistant => "assistant",
    }
}

pub fn write_transcript(out: &mut impl Write, turns: &[DisplayTurn]) -> io::Result<()> {
    if turns.is_empty() {
        return writeln!(out, "(empty chat)");
    }
    for turn in turns {
        writeln!(out, "{}> {}", speaker(turn.role), turn.content)?;
    }
    Ok(())
}

/// Numbered listing matching the indexes `/open` accepts.
pub fn write_sidebar(out: &mut impl Write, entries: &[SidebarEntry]) -> io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        let marker = if entry.active { '*' } else { ' ' };
        writeln!(out, "{marker}{:>3}. {}", i + 1, entry.label)?;
    }
    Ok(())
}

pub fn write_notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "! [{}] {}", notice.thread_id, notice.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn outcome(content: &str, error: Option<&str>) -> ExchangeOutcome {
        ExchangeOutcome {
            thread_id: ThreadId::from("t1"),
            reply: DisplayTurn::assistant(content),
            status: ToolStatus::Idle,
            error: error.map(str::to_string),
        }
    }

    mod renderer {
        use super::*;

        #[test]
        fn fragments_stream_inline() {
            let id = ThreadId::from("t1");
            let mut renderer = TerminalRenderer::new(Vec::new());

            renderer.on_text(&id, "Hel");
            renderer.on_text(&id, "lo!");
            renderer.on_finished(&outcome("Hello!", None));

            assert_eq!(rendered(renderer), "Hello!\n");
        }

        #[test]
        fn status_gets_its_own_line() {
            let id = ThreadId::from("t1");
            let mut renderer = TerminalRenderer::new(Vec::new());
            let running = ToolStatus::Running {
                tool_name: "search".to_string(),
            };

            renderer.on_status(&id, &running);
            renderer.on_text(&id, "Hel");
            renderer.on_status(&id, &running);
            renderer.on_text(&id, "lo!");
            renderer.on_status(
                &id,
                &ToolStatus::Finished {
                    tool_name: "search".to_string(),
                },
            );
            renderer.on_finished(&outcome("Hello!", None));

            assert_eq!(
                rendered(renderer),
                "[Using `search` …]\nHel\n[Using `search` …]\nlo!\n[Tool finished]\n"
            );
        }

        #[test]
        fn errors_are_flagged() {
            let id = ThreadId::from("t1");
            let mut renderer = TerminalRenderer::new(Vec::new());

            renderer.on_text(&id, "Parti");
            renderer.on_finished(&outcome("Parti", Some("Agent exited with code 1")));

            assert_eq!(rendered(renderer), "Parti\n! Agent exited with code 1\n");
        }

        #[test]
        fn idle_status_prints_nothing() {
            let mut renderer = TerminalRenderer::new(Vec::new());
            renderer.on_status(&ThreadId::from("t1"), &ToolStatus::Idle);
            assert_eq!(rendered(renderer), "");
        }
    }

    mod listings {
        use super::*;

        #[test]
        fn transcript_names_speakers() {
            let mut out = Vec::new();
            write_transcript(
                &mut out,
                &[
                    DisplayTurn::user("6*7?"),
                    DisplayTurn::assistant("Tool used: calculator"),
                    DisplayTurn::assistant("42"),
                ],
            )
            .unwrap();

            assert_eq!(
                String::from_utf8(out).unwrap(),
                "you> 6*7?\nassistant> Tool used: calculator\nassistant> 42\n"
            );
        }

        #[test]
        fn empty_transcript() {
            let mut out = Vec::new();
            write_transcript(&mut out, &[]).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "(empty chat)\n");
        }

        #[test]
        fn sidebar_is_numbered_and_marks_active() {
            let mut out = Vec::new();
            write_sidebar(
                &mut out,
                &[
                    SidebarEntry {
                        thread_id: ThreadId::from("b"),
                        label: "Untitled Chat".to_string(),
                        active: true,
                    },
                    SidebarEntry {
                        thread_id: ThreadId::from("a"),
                        label: "Trip to Oslo".to_string(),
                        active: false,
                    },
                ],
            )
            .unwrap();

            assert_eq!(
                String::from_utf8(out).unwrap(),
                "*  1. Untitled Chat\n   2. Trip to Oslo\n"
            );
        }

        #[test]
        fn notice_names_thread() {
            let mut out = Vec::new();
            let notice = Notice {
                thread_id: ThreadId::from("t9"),
                message: "disk full".to_string(),
            };
            write_notice(&mut out, &notice).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "! [t9] disk full\n");
        }
    }
}
