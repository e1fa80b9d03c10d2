//! Agent process spawning and I/O management.
//!
//! Spawns an agent command, feeds it a request on stdin, and exposes its
//! stdout/stderr lines and exit status through a single channel. Reader
//! threads do the blocking I/O so the consumer can wait with a timeout.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde::Serialize;

/// Exit status emitted when an agent process terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentExit {
    pub code: i32,
    pub signal: Option<i32>,
}

impl AgentExit {
    pub fn success(&self) -> bool {
        self.code == 0 && self.signal.is_none()
    }
}

/// Events emitted by an agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A line was read from stdout
    Stdout(String),
    /// A line was read from stderr
    Stderr(String),
    /// The process exited
    Exit(AgentExit),
}

/// Configuration for spawning an agent process.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Program to run
    pub program: String,
    /// Arguments to pass to the program
    pub args: Vec<String>,
    /// Working directory for the process
    pub working_dir: Option<String>,
    /// Written to stdin right after spawning; stdin is then closed
    pub initial_stdin: Option<String>,
}

impl SpawnConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            initial_stdin: None,
        }
    }

    /// Build a config from a shell-style command line (`"my-agent --fast"`).
    pub fn from_command_line(command_line: &str) -> Result<Self, String> {
        let mut parts = shlex::split(command_line)
            .ok_or_else(|| format!("Invalid command line: {command_line}"))?
            .into_iter();
        let program = parts
            .next()
            .ok_or_else(|| "Empty agent command".to_string())?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set a message to send on stdin.
    pub fn initial_stdin(mut self, message: impl Into<String>) -> Self {
        self.initial_stdin = Some(message.into());
        self
    }
}

/// A running agent process.
pub struct AgentProcess {
    child: Arc<Mutex<Option<Child>>>,
    event_receiver: Receiver<ProcessEvent>,
}

impl AgentProcess {
    /// Spawn a new agent process.
    ///
    /// Starts background threads for stdout/stderr reading and exit
    /// monitoring. The channel disconnects once all three are done, which is
    /// how consumers know every output line has been delivered.
    pub fn spawn(config: SpawnConfig) -> Result<Self, String> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("Failed to spawn {}: {}", config.program, e))?;

        // Written from its own thread: an agent may answer before it has read
        // a large request, and nobody would drain its stdout meanwhile.
        if let Some(mut stdin) = child.stdin.take() {
            let initial = config.initial_stdin.clone();
            let program = config.program.clone();
            thread::spawn(move || {
                if let Some(initial) = initial {
                    // An agent may exit without reading stdin; its output still counts.
                    if let Err(e) = writeln!(stdin, "{}", initial).and_then(|_| stdin.flush()) {
                        log::warn!("Failed to write initial stdin to {program}: {e}");
                    }
                }
                // Dropping stdin closes it so the agent sees EOF.
            });
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "Failed to capture stdout".to_string())?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| "Failed to capture stderr".to_string())?;

        let (tx, rx) = mpsc::channel();
        let child_arc = Arc::new(Mutex::new(Some(child)));

        let tx_stdout = tx.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                if tx_stdout.send(ProcessEvent::Stdout(line)).is_err() {
                    break;
                }
            }
        });

        let tx_stderr = tx.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                if tx_stderr.send(ProcessEvent::Stderr(line)).is_err() {
                    break;
                }
            }
        });

        let child_arc_exit = Arc::clone(&child_arc);
        let tx_exit = tx;
        thread::spawn(move || loop {
            {
                let Ok(mut guard) = child_arc_exit.lock() else {
                    break;
                };
                let Some(child) = guard.as_mut() else {
                    break;
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        let _ = tx_exit.send(ProcessEvent::Exit(exit_from_status(status)));
                        guard.take();
                        break;
                    }
                    Ok(None) => {}
                    Err(_) => {
                        guard.take();
                        break;
                    }
                }
            }
            thread::sleep(Duration::from_millis(20));
        });

        Ok(Self {
            child: child_arc,
            event_receiver: rx,
        })
    }

    /// Receive the next event, blocking until one is available.
    ///
    /// Returns `None` once every reader has finished.
    pub fn recv(&self) -> Option<ProcessEvent> {
        self.event_receiver.recv().ok()
    }

    /// Receive the next event, waiting at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ProcessEvent, RecvTimeoutError> {
        self.event_receiver.recv_timeout(timeout)
    }

    /// Check if the process is still running.
    pub fn is_running(&self) -> bool {
        self.child
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Force kill the process immediately.
    pub fn kill(&self) {
        if let Ok(mut guard) = self.child.lock() {
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

impl Drop for AgentProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn exit_from_status(status: std::process::ExitStatus) -> AgentExit {
    use std::os::unix::process::ExitStatusExt;
    AgentExit {
        code: status.code().unwrap_or(-1),
        signal: status.signal(),
    }
}

#[cfg(not(unix))]
fn exit_from_status(status: std::process::ExitStatus) -> AgentExit {
    AgentExit {
        code: status.code().unwrap_or(-1),
        signal: None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
