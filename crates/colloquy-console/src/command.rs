//! Parsing of console input lines.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/new`
    NewThread,
    /// `/threads`
    ListThreads,
    /// `/open <n>`, 1-based index into the `/threads` listing.
    Open(usize),
    /// `/help`
    Help,
    /// `/quit` or `/exit`
    Quit,
    /// Anything that isn't a command.
    Message(String),
    /// Blank input.
    Nothing,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("Usage: /open <number>")]
    MissingIndex,

    #[error("Not a thread number: {0}")]
    BadIndex(String),
}

pub const HELP: &str = "\
Commands:
  /new         start a new chat
  /threads     list chats, most recent first
  /open <n>    switch to chat number n
  /help        show this help
  /quit        leave
Anything else is sent as a message.";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Command::Nothing);
    }

    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Message(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    match name {
        "new" => Ok(Command::NewThread),
        "threads" | "ls" => Ok(Command::ListThreads),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "open" => {
            let arg = parts.next().ok_or(CommandError::MissingIndex)?;
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Open(n)),
                _ => Err(CommandError::BadIndex(arg.to_string())),
            }
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
