use serde::{Deserialize, Serialize};

/// A directed connection from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// An edge together with its creation sequence number.
#[derive(Debug, Clone)]
pub(crate) struct EdgeSlot {
    pub(crate) seq: u64,
    pub(crate) edge: Edge,
}
