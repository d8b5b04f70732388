//! Shell Handlers
//!
//! Executes parsed commands against a cache session.

use tracing::{info, warn};

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::shell::Command;
use crate::tasks::SweeperHandle;

const HELP: &str = "\
GET key           retrieve a value
PUT key value...  store a value
DEL key           remove a key
CLEAR             remove every entry
STATS             show statistics as JSON
SAVE path         write a snapshot
LOAD path         replace the cache from a snapshot
HELP              show this message
QUIT              exit";

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Normal output
    Text(String),
    /// The command failed; the session continues
    Error(String),
    /// The session should end
    Quit,
}

/// A cache plus the settings needed to rebuild it from a snapshot.
#[derive(Debug)]
pub struct Session {
    cache: Cache<String, String>,
    config: CacheConfig,
    sweeper: Option<SweeperHandle>,
}

impl Session {
    /// Creates a session with an empty cache. The sweeper is not started.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let cache = Cache::new(config.clone())?;
        Ok(Self {
            cache,
            config,
            sweeper: None,
        })
    }

    /// Starts (or restarts) the expiration sweeper for the current cache.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweeper(&mut self) {
        self.sweeper = Some(self.cache.spawn_sweeper());
    }

    pub fn cache(&self) -> &Cache<String, String> {
        &self.cache
    }

    /// Parses and executes one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(command) => self.execute(command).await,
            Err(err) => Reply::Error(err.to_string()),
        }
    }

    /// Executes a command.
    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Get { key } => match self.cache.get(&key).await {
                Some(value) => Reply::Text(value),
                None => Reply::Text("(nil)".to_string()),
            },
            Command::Put { key, value } => match self.cache.put(key, value).await {
                Ok(()) => Reply::Text("OK".to_string()),
                Err(err) => Reply::Error(err.to_string()),
            },
            Command::Del { key } => {
                let count = if self.cache.remove(&key).await { "1" } else { "0" };
                Reply::Text(count.to_string())
            }
            Command::Clear => {
                self.cache.clear().await;
                Reply::Text("OK".to_string())
            }
            Command::Stats => {
                let stats = self.cache.stats().await;
                match serde_json::to_string_pretty(&stats) {
                    Ok(json) => Reply::Text(json),
                    Err(err) => Reply::Error(err.to_string()),
                }
            }
            Command::Save { path } => self.save(&path).await,
            Command::Load { path } => self.load(&path).await,
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    async fn save(&self, path: &str) -> Reply {
        let bytes = match self.cache.serialize().await {
            Ok(bytes) => bytes,
            Err(err) => return Reply::Error(err.to_string()),
        };
        match tokio::fs::write(path, &bytes).await {
            Ok(()) => {
                info!(path, bytes = bytes.len(), "snapshot saved");
                Reply::Text(format!("saved {} bytes to {}", bytes.len(), path))
            }
            Err(err) => Reply::Error(format!("cannot write {}: {}", path, err)),
        }
    }

    async fn load(&mut self, path: &str) -> Reply {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => return Reply::Error(format!("cannot read {}: {}", path, err)),
        };
        let cache = match Cache::deserialize_with(&bytes, self.config.clone()) {
            Ok(cache) => cache,
            Err(err) => {
                warn!(path, error = %err, "snapshot rejected");
                return Reply::Error(err.to_string());
            }
        };

        self.cache = cache;
        if self.sweeper.is_some() {
            self.start_sweeper();
        }
        let size = self.cache.len().await;
        Reply::Text(format!("loaded {} entries from {}", size, path))
    }
}
