//! The in-memory strategy graph and its mutation operations.
//!
//! Mutations only enforce local constraints (unique ids, edges between
//! existing nodes). Global well-formedness is the validator's job.

mod edge;
mod index;
mod node;
mod snapshot;

pub use edge::Edge;
pub use index::GraphIndex;
pub use node::*;
pub use snapshot::{FlowSnapshot, IntoGraph};

use crate::error::GraphError;
use ahash::AHashSet;
use edge::EdgeSlot;
use tracing::trace;

/// A value tagged with the graph revision it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Revisioned<T> {
    pub revision: u64,
    pub value: T,
}

/// A strategy graph owned by a single caller.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<EdgeSlot>,
    node_ids: AHashSet<String>,
    edge_ids: AHashSet<String>,
    next_seq: u64,
    revision: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start -> EMA(20) > 100 -> Output.
    pub fn default_template() -> Self {
        let mut graph = Self::new();
        for node in [
            Node::start("start").at(0.0, 0.0),
            Node::indicator(
                "indicator-1",
                IndicatorPayload::new(IndicatorType::Ema, 20, ComparisonOp::GreaterThan, 100.0),
            )
            .at(200.0, 0.0),
            Node::output("output").at(400.0, 0.0),
        ] {
            graph.push_node(node);
        }
        graph.push_edge(Edge::new("e-start-indicator-1", "start", "indicator-1"));
        graph.push_edge(Edge::new("e-indicator-1-output", "indicator-1", "output"));
        graph
    }

    /// Builds a graph from a persisted snapshot.
    ///
    /// Only local constraints are enforced here; the edge list order becomes
    /// the creation order.
    pub fn from_snapshot(snapshot: FlowSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in snapshot.nodes {
            graph.add_node(node)?;
        }
        for edge in snapshot.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    pub fn to_snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Monotonic counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tag<T>(&self, value: T) -> Revisioned<T> {
        Revisioned {
            revision: self.revision,
            value,
        }
    }

    /// True if `value` was derived from the graph in its current state.
    pub fn is_current<T>(&self, value: &Revisioned<T>) -> bool {
        value.revision == self.revision
    }

    // --- Queries ---

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    /// Hash lookup tables for walks that touch every node.
    pub fn index(&self) -> GraphIndex<'_> {
        GraphIndex::new(self)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Edges in creation order. Slots are only ever appended, so storage
    /// order is creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().map(|slot| &slot.edge)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges().find(|e| e.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// The first Start node, if any.
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes_of_kind(NodeKind::Start).next()
    }

    /// Outgoing edges of `node_id`, ordered by creation.
    pub fn outgoing(&self, node_id: &str) -> Vec<&Edge> {
        self.ordered_edges(|e| e.source == node_id)
    }

    /// Incoming edges of `node_id`, ordered by creation.
    pub fn incoming(&self, node_id: &str) -> Vec<&Edge> {
        self.ordered_edges(|e| e.target == node_id)
    }

    /// Target nodes of `node_id`'s outgoing edges, ordered by edge creation.
    pub fn children_in_order(&self, node_id: &str) -> Vec<&Node> {
        self.outgoing(node_id)
            .into_iter()
            .filter_map(|e| self.node(&e.target))
            .collect()
    }

    fn ordered_edges(&self, keep: impl Fn(&Edge) -> bool) -> Vec<&Edge> {
        let mut slots: Vec<&EdgeSlot> = self.edges.iter().filter(|s| keep(&s.edge)).collect();
        slots.sort_by_key(|s| s.seq);
        slots.into_iter().map(|s| &s.edge).collect()
    }

    // --- Mutations ---

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        trace!(node_id = %node.id, kind = %node.kind(), "adding node");
        self.push_node(node);
        self.bump();
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.contains_edge(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::UnknownNode(endpoint.clone()));
            }
        }
        trace!(edge_id = %edge.id, source = %edge.source, target = %edge.target, "adding edge");
        self.push_edge(edge);
        self.bump();
        Ok(())
    }

    /// Adds an edge with a generated `e<source>-<target>` id and returns that id.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        let base = format!("e{}-{}", source, target);
        let mut id = base.clone();
        let mut suffix = 1;
        while self.contains_edge(&id) {
            suffix += 1;
            id = format!("{}-{}", base, suffix);
        }
        self.add_edge(Edge::new(id.clone(), source, target))?;
        Ok(id)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|s| s.edge.id == edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.to_string()))?;
        let slot = self.edges.remove(index);
        self.edge_ids.remove(edge_id);
        self.bump();
        Ok(slot.edge)
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.to_string()))?;
        let node = self.nodes.remove(index);
        self.node_ids.remove(node_id);
        let before = self.edges.len();
        let edge_ids = &mut self.edge_ids;
        self.edges.retain(|s| {
            let keep = !s.edge.touches(node_id);
            if !keep {
                edge_ids.remove(&s.edge.id);
            }
            keep
        });
        trace!(node_id, removed_edges = before - self.edges.len(), "removed node");
        self.bump();
        Ok(node)
    }

    pub fn update_indicator(
        &mut self,
        node_id: &str,
        payload: IndicatorPayload,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(node_id)?;
        match &mut node.data {
            NodePayload::Indicator(current) => *current = payload,
            other => {
                return Err(GraphError::KindMismatch {
                    node_id: node_id.to_string(),
                    expected: NodeKind::Indicator,
                    found: other.kind(),
                });
            }
        }
        self.bump();
        Ok(())
    }

    pub fn update_logic(&mut self, node_id: &str, operator: LogicOperator) -> Result<(), GraphError> {
        let node = self.node_mut(node_id)?;
        match &mut node.data {
            NodePayload::LogicGroup { operator: current } => *current = operator,
            other => {
                return Err(GraphError::KindMismatch {
                    node_id: node_id.to_string(),
                    expected: NodeKind::LogicGroup,
                    found: other.kind(),
                });
            }
        }
        self.bump();
        Ok(())
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), GraphError> {
        self.node_mut(node_id)?.position = position;
        self.bump();
        Ok(())
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.to_string()))
    }

    fn push_node(&mut self, node: Node) {
        self.node_ids.insert(node.id.clone());
        self.nodes.push(node);
    }

    fn push_edge(&mut self, edge: Edge) {
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(EdgeSlot {
            seq: self.next_seq,
            edge,
        });
        self.next_seq += 1;
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_mutation_keeps_revision() {
        let mut graph = Graph::default_template();
        let rev = graph.revision();
        assert!(graph.add_node(Node::start("start")).is_err());
        assert!(graph.connect("start", "missing").is_err());
        assert!(graph.remove_edge("nope").is_err());
        assert_eq!(graph.revision(), rev);
    }

    #[test]
    fn connect_generates_unique_ids() {
        let mut graph = Graph::new();
        graph.add_node(Node::start("1")).unwrap();
        graph.add_node(Node::output("2")).unwrap();
        assert_eq!(graph.connect("1", "2").unwrap(), "e1-2");
        assert_eq!(graph.connect("1", "2").unwrap(), "e1-2-2");
        assert_eq!(graph.outgoing("1").len(), 2);
    }

    #[test]
    fn kind_mismatch_on_wrong_payload_edit() {
        let mut graph = Graph::default_template();
        let err = graph.update_logic("indicator-1", LogicOperator::Or).unwrap_err();
        assert_eq!(
            err,
            GraphError::KindMismatch {
                node_id: "indicator-1".to_string(),
                expected: NodeKind::LogicGroup,
                found: NodeKind::Indicator,
            }
        );
    }
}
