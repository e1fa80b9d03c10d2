//! ColloquyContext - the wired-up pieces a front end needs.
//!
//! ```text
//!              ┌───────────────────────────┐
//!              │      ColloquyContext      │
//!              ├───────────────────────────┤
//!              │  - JsonlThreadStore       │
//!              │  - ProcessAgent ──────────┼──► records into the store
//!              │  - EventBus (opt-in)      │
//!              └─────────────┬─────────────┘
//!                            │ session()
//!                            ▼
//!              ConversationSessionManager
//! ```
//!
//! Each call to [`ColloquyContext::session`] starts an independent session
//! over the same store and agent.

use std::sync::Arc;

use crate::agents::{ProcessAgent, ProcessAgentConfig};
use crate::config::{ColloquyConfig, ConfigError};
use crate::event_bus::EventBus;
use crate::session::ConversationSessionManager;
use crate::store::{JsonlThreadStore, ThreadStore};

/// Session manager over the default file store and process agent.
pub type DefaultSession = ConversationSessionManager<Arc<JsonlThreadStore>, Arc<ProcessAgent>>;

#[derive(Default)]
pub struct ColloquyContextBuilder {
    config: ColloquyConfig,
    event_bus: Option<Arc<EventBus>>,
}

impl ColloquyContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ColloquyConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish exchanges on `bus`. Without one, nothing is broadcast.
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Build the context. Fails only if no data directory can be resolved.
    pub fn build(self) -> Result<ColloquyContext, ConfigError> {
        let threads_dir = self.config.threads_dir()?;
        let store = Arc::new(JsonlThreadStore::new(threads_dir));

        let mut agent_config = ProcessAgentConfig::new(self.config.agent_command());
        if let Some(timeout) = self.config.agent_idle_timeout() {
            agent_config = agent_config.idle_timeout(timeout);
        }
        if let Some(dir) = &self.config.log_dir {
            agent_config = agent_config.log_dir(dir.clone());
        }
        let recorder: Arc<dyn ThreadStore> = store.clone();
        let agent = Arc::new(ProcessAgent::new(agent_config).with_store(recorder));

        log::info!(
            "Colloquy context: threads in {}, agent `{}`",
            store.dir().display(),
            self.config.agent_command()
        );

        Ok(ColloquyContext {
            config: self.config,
            store,
            agent,
            event_bus: self.event_bus,
        })
    }
}

/// Shared state behind every session. Cloning only clones the pointers.
#[derive(Clone)]
pub struct ColloquyContext {
    config: ColloquyConfig,
    pub store: Arc<JsonlThreadStore>,
    pub agent: Arc<ProcessAgent>,
    /// Set when a front end wants exchanges broadcast to subscribers.
    pub event_bus: Option<Arc<EventBus>>,
}

impl ColloquyContext {
    pub fn builder() -> ColloquyContextBuilder {
        ColloquyContextBuilder::new()
    }

    pub fn config(&self) -> &ColloquyConfig {
        &self.config
    }

    /// Start a new session over the shared store and agent.
    pub fn session(&self) -> DefaultSession {
        ConversationSessionManager::new(Arc::clone(&self.store), Arc::clone(&self.agent))
    }
}
