//! Structural checks run before every compilation.
//!
//! Validation is pure and total: it never mutates the graph, it terminates on
//! cyclic graphs, and it reports every violation it finds in a single pass.

mod violation;

pub use violation::{Invariant, StructuralViolation};

use crate::graph::{Graph, GraphIndex, Node, NodeKind, NodePayload};
use ahash::AHashSet;
use itertools::Itertools;
use std::fmt;
use tracing::{debug, info};

/// How a Start node with several outgoing edges is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
    /// Report `MultipleRootsUnsupported`.
    #[default]
    Reject,
    /// Accept it; the compiler joins the roots under a top-level OR.
    ImplicitOr,
}

/// Outcome of validating a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<StructuralViolation>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// The violations found, empty for a valid graph.
    pub fn violations(&self) -> &[StructuralViolation] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }

    pub fn into_result(self) -> Result<(), Vec<StructuralViolation>> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(violations) => Err(violations),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "valid"),
            ValidationResult::Invalid(violations) => {
                write!(f, "{}", violations.iter().join("\n"))
            }
        }
    }
}

/// Checks a graph against the structural rules of a strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    root_policy: RootPolicy,
}

/// Validates with the default [`RootPolicy::Reject`].
pub fn validate(graph: &Graph) -> ValidationResult {
    Validator::new().validate(graph)
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_policy(mut self, policy: RootPolicy) -> Self {
        self.root_policy = policy;
        self
    }

    pub fn root_policy(&self) -> RootPolicy {
        self.root_policy
    }

    pub fn validate(&self, graph: &Graph) -> ValidationResult {
        let mut violations = Vec::new();
        let index = graph.index();
        let starts: Vec<&Node> = graph.nodes_of_kind(NodeKind::Start).collect();

        match starts.len() {
            0 => violations.push(StructuralViolation::MissingStart),
            1 => {}
            _ => violations.push(StructuralViolation::MultipleStarts {
                node_ids: starts.iter().map(|n| n.id.clone()).collect(),
            }),
        }
        if graph.nodes_of_kind(NodeKind::Output).next().is_none() {
            violations.push(StructuralViolation::MissingOutput);
        }

        check_payloads(graph, &mut violations);
        check_degrees(graph, &index, &mut violations);
        check_child_kinds(graph, &index, &mut violations);
        if let [start] = starts.as_slice() {
            self.check_roots(&index, start, &mut violations);
        }

        let mut walk = CycleWalk::new(&index);
        for start in starts.iter().copied() {
            walk.visit(&start.id);
        }
        let reached = walk.visited.clone();
        // Cycles outside the Start-reachable part still have to be reported.
        for node in graph.nodes() {
            walk.visit(&node.id);
        }
        violations.append(&mut walk.found);

        if !starts.is_empty() {
            violations.extend(
                graph
                    .nodes()
                    .filter(|n| !reached.contains(n.id.as_str()))
                    .map(|n| StructuralViolation::UnreachableNode {
                        node_id: n.id.clone(),
                    }),
            );
        }

        info!(
            revision = graph.revision(),
            nodes = graph.node_count(),
            violations = violations.len(),
            "validated strategy graph"
        );
        if violations.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(violations)
        }
    }

    fn check_roots(
        &self,
        index: &GraphIndex<'_>,
        start: &Node,
        violations: &mut Vec<StructuralViolation>,
    ) {
        let roots = index.children(&start.id);
        if roots.len() > 1 && self.root_policy == RootPolicy::Reject {
            violations.push(StructuralViolation::MultipleRootsUnsupported {
                start_id: start.id.clone(),
                root_ids: roots.iter().map(|n| n.id.clone()).collect(),
            });
        }
    }
}

fn check_payloads(graph: &Graph, violations: &mut Vec<StructuralViolation>) {
    for node in graph.nodes() {
        if let NodePayload::Indicator(payload) = &node.data {
            if payload.period == 0 {
                violations.push(StructuralViolation::InvalidPeriod {
                    node_id: node.id.clone(),
                });
            }
            if !payload.value.is_finite() {
                violations.push(StructuralViolation::NonFiniteThreshold {
                    node_id: node.id.clone(),
                });
            }
        }
    }
}

fn check_degrees(graph: &Graph, index: &GraphIndex<'_>, violations: &mut Vec<StructuralViolation>) {
    for node in graph.nodes() {
        let kind = node.kind();
        if kind != NodeKind::Start && index.in_degree(&node.id) == 0 {
            violations.push(StructuralViolation::MissingIncoming {
                node_id: node.id.clone(),
            });
        }
        if kind != NodeKind::Output && index.out_degree(&node.id) == 0 {
            violations.push(StructuralViolation::MissingOutgoing {
                node_id: node.id.clone(),
            });
        }
    }
}

fn check_child_kinds(
    graph: &Graph,
    index: &GraphIndex<'_>,
    violations: &mut Vec<StructuralViolation>,
) {
    for node in graph.nodes() {
        for child in index.children(&node.id) {
            let child_kind = child.kind();
            let violation = match node.kind() {
                NodeKind::LogicGroup
                    if matches!(child_kind, NodeKind::Start | NodeKind::Output) =>
                {
                    Some(StructuralViolation::IllegalLogicGroupChild {
                        group_id: node.id.clone(),
                        child_id: child.id.clone(),
                        child_kind,
                    })
                }
                NodeKind::Indicator if child_kind != NodeKind::Output => {
                    Some(StructuralViolation::IllegalIndicatorChild {
                        indicator_id: node.id.clone(),
                        child_id: child.id.clone(),
                        child_kind,
                    })
                }
                NodeKind::Output => Some(StructuralViolation::IllegalOutputEdge {
                    output_id: node.id.clone(),
                    child_id: child.id.clone(),
                }),
                NodeKind::Start if child_kind == NodeKind::Output => {
                    Some(StructuralViolation::StartTargetsOutput {
                        start_id: node.id.clone(),
                        output_id: child.id.clone(),
                    })
                }
                _ => None,
            };
            violations.extend(violation);
        }
    }
}

/// Depth-first walk tracking the nodes on the current path.
///
/// The path is an explicit stack of `(node, next child position)` frames, so
/// the walk depth is bounded by memory rather than by the thread stack.
struct CycleWalk<'g> {
    index: &'g GraphIndex<'g>,
    visited: AHashSet<&'g str>,
    on_stack: AHashSet<&'g str>,
    reported: AHashSet<&'g str>,
    found: Vec<StructuralViolation>,
}

impl<'g> CycleWalk<'g> {
    fn new(index: &'g GraphIndex<'g>) -> Self {
        Self {
            index,
            visited: AHashSet::new(),
            on_stack: AHashSet::new(),
            reported: AHashSet::new(),
            found: Vec::new(),
        }
    }

    fn visit(&mut self, root: &'g str) {
        if !self.visited.insert(root) {
            return;
        }
        self.on_stack.insert(root);

        let index = self.index;
        let mut path: Vec<(&'g str, usize)> = vec![(root, 0)];
        while let Some(frame) = path.last_mut() {
            let node_id = frame.0;
            let Some(child) = index.children(node_id).get(frame.1) else {
                self.on_stack.remove(node_id);
                path.pop();
                continue;
            };
            frame.1 += 1;

            let child = child.id.as_str();
            if self.on_stack.contains(child) {
                // Stop along this branch, the rest of the graph is still walked.
                if self.reported.insert(child) {
                    debug!(node_id = child, "cycle detected");
                    self.found.push(StructuralViolation::CycleDetected {
                        node_id: child.to_string(),
                    });
                }
            } else if self.visited.insert(child) {
                self.on_stack.insert(child);
                path.push((child, 0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ComparisonOp, IndicatorPayload, IndicatorType, Node};

    fn ema() -> IndicatorPayload {
        IndicatorPayload::new(IndicatorType::Ema, 20, ComparisonOp::GreaterThan, 1000.0)
    }

    #[test]
    fn index_keeps_creation_order() {
        let mut graph = Graph::new();
        graph.add_node(Node::logic_group("g", crate::graph::LogicOperator::And)).unwrap();
        graph.add_node(Node::indicator("b", ema())).unwrap();
        graph.add_node(Node::indicator("a", ema())).unwrap();
        graph.connect("g", "b").unwrap();
        graph.connect("g", "a").unwrap();
        let index = graph.index();
        let children: Vec<&str> = index.children("g").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["b", "a"]);
        assert!(index.children("a").is_empty());
        assert_eq!(index.in_degree("a"), 1);
    }

    #[test]
    fn self_loop_is_reported_once() {
        let mut graph = Graph::new();
        graph.add_node(Node::start("s")).unwrap();
        graph.add_node(Node::indicator("i", ema())).unwrap();
        graph.connect("s", "i").unwrap();
        graph.connect("i", "i").unwrap();
        graph.connect("i", "i").unwrap();
        let index = graph.index();
        let mut walk = CycleWalk::new(&index);
        walk.visit("s");
        assert_eq!(
            walk.found,
            vec![StructuralViolation::CycleDetected {
                node_id: "i".to_string()
            }]
        );
        assert!(walk.on_stack.is_empty());
    }

    #[test]
    fn long_chain_walks_without_recursion() {
        let mut graph = Graph::new();
        graph.add_node(Node::start("s")).unwrap();
        let mut previous = "s".to_string();
        for i in 0..50_000 {
            let id = format!("g{}", i);
            graph
                .add_node(Node::logic_group(id.clone(), crate::graph::LogicOperator::And))
                .unwrap();
            graph.connect(&previous, &id).unwrap();
            previous = id;
        }
        graph.connect(&previous, "g0").unwrap();
        let index = graph.index();
        let mut walk = CycleWalk::new(&index);
        walk.visit("s");
        assert_eq!(walk.visited.len(), 50_001);
        assert_eq!(
            walk.found,
            vec![StructuralViolation::CycleDetected {
                node_id: "g0".to_string()
            }]
        );
    }
}
