//! Agent backed by an external process.
//!
//! Each user message spawns the configured command once. The request goes
//! to stdin as a single JSON line:
//!
//! ```text
//! {"thread_id":"5f0c...","message":"What's the weather in Oslo?"}
//! ```
//!
//! The process answers with one [`AgentEvent`] per stdout line and exits.
//! stderr is forwarded to the log. A non-zero exit ends the stream with
//! [`AgentError::Exited`]; silence longer than the idle timeout kills the
//! process and ends the stream with [`AgentError::Timeout`].

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::event::AgentEvent;
use super::parser::EventLineParser;
use super::{Agent, AgentError, EventStream};
use crate::logging::{log_line, open_log_file, LogHandle};
use crate::spawn::{AgentExit, AgentProcess, ProcessEvent, SpawnConfig};
use crate::store::ThreadStore;
use crate::thread::{ThreadId, Turn};

/// Configuration for a [`ProcessAgent`].
#[derive(Debug, Clone)]
pub struct ProcessAgentConfig {
    /// Shell-style command line, e.g. `python3 -u agent.py`.
    pub command_line: String,
    /// Working directory for the agent process.
    pub working_dir: Option<String>,
    /// Kill the agent if it prints nothing for this long.
    pub idle_timeout: Option<Duration>,
    /// Directory for per-thread agent I/O logs.
    pub log_dir: Option<PathBuf>,
}

impl ProcessAgentConfig {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: None,
            idle_timeout: None,
            log_dir: None,
        }
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    thread_id: &'a ThreadId,
    message: &'a str,
}

/// Runs an agent command per message and streams its events.
///
/// With a store attached, the agent records the exchange itself: the user
/// turn when the run starts, tool turns as they are announced, and the
/// assistant turn when the stream ends.
pub struct ProcessAgent {
    config: ProcessAgentConfig,
    store: Option<Arc<dyn ThreadStore>>,
}

impl ProcessAgent {
    pub fn new(config: ProcessAgentConfig) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Record each exchange into `store`.
    pub fn with_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &ProcessAgentConfig {
        &self.config
    }
}

impl Agent for ProcessAgent {
    fn run(&self, thread_id: &ThreadId, user_text: &str) -> Result<EventStream, AgentError> {
        let request = serde_json::to_string(&AgentRequest {
            thread_id,
            message: user_text,
        })
        .map_err(|e| AgentError::Parse(e.to_string()))?;

        let mut spawn_config =
            SpawnConfig::from_command_line(&self.config.command_line).map_err(AgentError::Spawn)?;
        if let Some(dir) = &self.config.working_dir {
            spawn_config = spawn_config.working_dir(dir.clone());
        }
        spawn_config = spawn_config.initial_stdin(request.clone());

        let log = open_log_file(self.config.log_dir.as_deref(), thread_id.as_str());
        log_line(&log, "STDIN", &request);

        let process = AgentProcess::spawn(spawn_config).map_err(AgentError::Spawn)?;
        log::info!(
            "Started agent `{}` for thread {}",
            self.config.command_line,
            thread_id
        );

        let recorder = self.store.as_ref().map(|store| {
            let recorder = TurnRecorder {
                store: Arc::clone(store),
                thread_id: thread_id.clone(),
                reply: String::new(),
            };
            recorder.append(Turn::user(user_text));
            recorder
        });

        Ok(Box::new(ProcessEventStream {
            process,
            parser: EventLineParser::new(),
            idle_timeout: self.config.idle_timeout,
            exit: None,
            finished: false,
            log,
            recorder,
        }))
    }
}

/// Writes the turns of one exchange to the thread store.
struct TurnRecorder {
    store: Arc<dyn ThreadStore>,
    thread_id: ThreadId,
    reply: String,
}

impl TurnRecorder {
    fn observe(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::Tool { tool_name } => self.append(Turn::tool(tool_name.clone(), "")),
            AgentEvent::Text { text } => self.reply.push_str(text),
            _ => {}
        }
    }

    fn commit(self) {
        let reply = Turn::assistant(self.reply.clone());
        self.append(reply);
    }

    fn append(&self, turn: Turn) {
        if let Err(e) = self.store.append_turn(&self.thread_id, &turn) {
            log::warn!("Failed to record turn for thread {}: {e}", self.thread_id);
        }
    }
}

enum Received {
    Event(ProcessEvent),
    TimedOut(Duration),
    Closed,
}

struct ProcessEventStream {
    process: AgentProcess,
    parser: EventLineParser,
    idle_timeout: Option<Duration>,
    exit: Option<AgentExit>,
    finished: bool,
    log: LogHandle,
    recorder: Option<TurnRecorder>,
}

impl ProcessEventStream {
    fn receive(&self) -> Received {
        match self.idle_timeout {
            Some(timeout) => match self.process.recv_timeout(timeout) {
                Ok(event) => Received::Event(event),
                Err(RecvTimeoutError::Timeout) => Received::TimedOut(timeout),
                Err(RecvTimeoutError::Disconnected) => Received::Closed,
            },
            None => self
                .process
                .recv()
                .map(Received::Event)
                .unwrap_or(Received::Closed),
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(recorder) = self.recorder.take() {
            recorder.commit();
        }
    }
}

impl Iterator for ProcessEventStream {
    type Item = Result<AgentEvent, AgentError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.receive() {
                Received::Event(ProcessEvent::Stdout(line)) => {
                    log_line(&self.log, "STDOUT", &line);
                    let Some(event) = self.parser.parse_line(&line) else {
                        continue;
                    };
                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.observe(&event);
                    }
                    if matches!(event, AgentEvent::Done | AgentEvent::Error { .. }) {
                        self.finish();
                    }
                    return Some(Ok(event));
                }
                Received::Event(ProcessEvent::Stderr(line)) => {
                    log_line(&self.log, "STDERR", &line);
                    log::warn!("agent stderr: {line}");
                }
                Received::Event(ProcessEvent::Exit(exit)) => {
                    log_line(&self.log, "EXIT", &format!("{:?}", exit));
                    self.exit = Some(exit);
                }
                Received::TimedOut(timeout) => {
                    log::warn!("Agent idle for {:?}, killing it", timeout);
                    self.process.kill();
                    self.finish();
                    return Some(Err(AgentError::Timeout(timeout)));
                }
                Received::Closed => {
                    self.finish();
                    return match self.exit.take() {
                        Some(exit) if !exit.success() => Some(Err(AgentError::Exited(exit.code))),
                        _ => None,
                    };
                }
            }
        }
        None
    }
}

impl Drop for ProcessEventStream {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
