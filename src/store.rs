//! The persistence collaborator contract and two stores implementing it.

use crate::error::StoreError;
use crate::graph::FlowSnapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Saves and loads the raw `(nodes, edges)` pair of a strategy graph.
///
/// Loading when nothing was saved yet yields an empty snapshot.
pub trait FlowStore {
    fn save(&mut self, snapshot: &FlowSnapshot) -> Result<(), StoreError>;
    fn load(&self) -> Result<FlowSnapshot, StoreError>;
}

/// Keeps a single saved flow in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: FlowSnapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for MemoryStore {
    fn save(&mut self, snapshot: &FlowSnapshot) -> Result<(), StoreError> {
        self.slot = snapshot.clone();
        debug!(nodes = snapshot.nodes.len(), "flow saved in memory");
        Ok(())
    }

    fn load(&self) -> Result<FlowSnapshot, StoreError> {
        Ok(self.slot.clone())
    }
}

/// Stores the flow as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl FlowStore for JsonFileStore {
    fn save(&mut self, snapshot: &FlowSnapshot) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Format(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        info!(path = %self.path.display(), nodes = snapshot.nodes.len(), "flow saved");
        Ok(())
    }

    fn load(&self) -> Result<FlowSnapshot, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FlowSnapshot::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        let snapshot: FlowSnapshot =
            serde_json::from_str(&content).map_err(|e| StoreError::Format(e.to_string()))?;
        info!(path = %self.path.display(), nodes = snapshot.nodes.len(), "flow loaded");
        Ok(snapshot)
    }
}
