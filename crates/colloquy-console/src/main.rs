//! `colloquy` - chat with an agent from the terminal.

mod command;
mod render;
mod repl;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colloquy_core::config::{load_config, ColloquyConfig};
use colloquy_core::paths;
use colloquy_core::ColloquyContext;

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(about = "Chat with an agent, one thread at a time", long_about = None)]
struct Cli {
    /// Config file (JSON). Defaults to ~/.config/colloquy/config.json
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where threads are stored
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Agent command line, e.g. "python3 -u agent.py"
    #[arg(long)]
    agent: Option<String>,

    /// Kill the agent after this many seconds without output
    #[arg(long)]
    timeout: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> Result<ColloquyConfig, Box<dyn std::error::Error>> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => paths::default_config_path()?,
        };
        let mut config = load_config(&path)?;

        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(agent) = &self.agent {
            config.agent_command = Some(agent.clone());
        }
        if let Some(secs) = self.timeout {
            config.agent_idle_timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.load_config()?;
    let context = ColloquyContext::builder().config(config).build()?;

    let mut console = repl::Console::new(context.session(), io::stdout());
    if let Some(bus) = &context.event_bus {
        console = console.with_event_bus(Arc::clone(bus));
    }
    console.run(io::stdin().lock())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("colloquy: {e}");
            ExitCode::FAILURE
        }
    }
}
