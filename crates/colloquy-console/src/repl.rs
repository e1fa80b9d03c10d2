//! The read-eval-print loop over one session.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use colloquy_core::agents::Agent;
use colloquy_core::event_bus::EventBus;
use colloquy_core::session::{ConversationSessionManager, Tee};
use colloquy_core::store::ThreadStore;

use crate::command::{self, Command, HELP};
use crate::render::{write_notice, write_sidebar, write_transcript, TerminalRenderer};

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<S, A, W: Write> {
    session: ConversationSessionManager<S, A>,
    out: W,
    bus: Option<Arc<EventBus>>,
}

impl<S: ThreadStore, A: Agent, W: Write> Console<S, A, W> {
    pub fn new(session: ConversationSessionManager<S, A>, out: W) -> Self {
        Self {
            session,
            out,
            bus: None,
        }
    }

    /// Also publish every exchange on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn session(&self) -> &ConversationSessionManager<S, A> {
        &self.session
    }

    /// Read lines until `/quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        writeln!(self.out, "colloquy - type /help for commands")?;
        for line in input.lines() {
            if self.handle_line(&line?)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Nothing => {}
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::NewThread => {
                self.session.start_new_thread();
                writeln!(self.out, "Started a new chat.")?;
            }
            Command::ListThreads => write_sidebar(&mut self.out, &self.session.sidebar())?,
            Command::Open(n) => self.open(n)?,
            Command::Message(text) => self.send(&text)?,
        }
        self.flush_notice()?;
        Ok(Flow::Continue)
    }

    fn open(&mut self, n: usize) -> io::Result<()> {
        let Some(entry) = self.session.sidebar().into_iter().nth(n - 1) else {
            return writeln!(self.out, "No chat number {n}; see /threads.");
        };

        match self.session.select_thread(&entry.thread_id) {
            Ok(()) => {
                writeln!(self.out, "== {} ==", entry.label)?;
                write_transcript(&mut self.out, self.session.displayed_turns())
            }
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    fn send(&mut self, text: &str) -> io::Result<()> {
        let mut renderer = TerminalRenderer::new(&mut self.out);
        let result = match self.bus.as_deref() {
            Some(bus) => self
                .session
                .submit_message(text, &mut Tee(&mut renderer, bus)),
            None => self.session.submit_message(text, &mut renderer),
        };
        if let Err(e) = result {
            writeln!(self.out, "{e}")?;
        }
        Ok(())
    }

    fn flush_notice(&mut self) -> io::Result<()> {
        // Exchange errors were already printed inline by the renderer.
        if let Some(notice) = self.session.take_notice() {
            log::debug!("Notice for {}: {}", notice.thread_id, notice.message);
            if self.session.displayed_turns().is_empty() {
                write_notice(&mut self.out, &notice)?;
            }
        }
        Ok(())
    }
}
