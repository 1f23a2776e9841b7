use super::{Edge, Graph, Node};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// The `(nodes, edges)` pair exchanged with the persistence collaborator.
///
/// Edge order in `edges` is the creation order of the edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// A trait for foreign graph formats that can be turned into a [`Graph`].
///
/// Implement it on the structs of an editor's native save format to load
/// them without going through [`FlowSnapshot`].
///
/// # Example
///
/// ```rust
/// use signalflow::error::GraphError;
/// use signalflow::graph::{Graph, IntoGraph, Node};
///
/// struct Chain(Vec<Node>);
///
/// impl IntoGraph for Chain {
///     fn into_graph(self) -> Result<Graph, GraphError> {
///         let mut graph = Graph::new();
///         let mut previous: Option<String> = None;
///         for node in self.0 {
///             let id = node.id.clone();
///             graph.add_node(node)?;
///             if let Some(prev) = previous {
///                 graph.connect(&prev, &id)?;
///             }
///             previous = Some(id);
///         }
///         Ok(graph)
///     }
/// }
///
/// let graph = Chain(vec![Node::start("s"), Node::output("o")]).into_graph().unwrap();
/// assert_eq!(graph.edges().count(), 1);
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph model.
    fn into_graph(self) -> Result<Graph, GraphError>;
}

impl IntoGraph for FlowSnapshot {
    fn into_graph(self) -> Result<Graph, GraphError> {
        Graph::from_snapshot(self)
    }
}
