use super::{Graph, Node};
use ahash::AHashMap;

/// Read-only lookup tables over a graph, built once per validation or
/// compilation so every walk step is a hash lookup instead of a scan.
///
/// Children are kept in edge creation order.
#[derive(Debug)]
pub struct GraphIndex<'g> {
    nodes: AHashMap<&'g str, &'g Node>,
    children: AHashMap<&'g str, Vec<&'g Node>>,
    in_degree: AHashMap<&'g str, usize>,
}

impl<'g> GraphIndex<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let nodes: AHashMap<&'g str, &'g Node> =
            graph.nodes().map(|n| (n.id.as_str(), n)).collect();
        let mut children: AHashMap<&'g str, Vec<&'g Node>> = AHashMap::with_capacity(nodes.len());
        let mut in_degree: AHashMap<&'g str, usize> = AHashMap::with_capacity(nodes.len());

        for edge in graph.edges() {
            let Some(&target) = nodes.get(edge.target.as_str()) else {
                continue;
            };
            children
                .entry(edge.source.as_str())
                .or_default()
                .push(target);
            *in_degree.entry(edge.target.as_str()).or_default() += 1;
        }

        Self {
            nodes,
            children,
            in_degree,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    /// Targets of `id`'s outgoing edges, one entry per edge.
    pub fn children(&self, id: &str) -> &[&'g Node] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.in_degree.get(id).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.children(id).len()
    }
}
