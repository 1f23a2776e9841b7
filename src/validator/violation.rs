use crate::graph::NodeKind;
use thiserror::Error;

/// The structural rule a violation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// Exactly one Start node and at least one Output node.
    Terminals,
    /// The graph reachable from Start is acyclic.
    Acyclic,
    /// Every non-Start node has an incoming edge, every non-Output node an
    /// outgoing one, and every node is reachable from Start.
    Connectivity,
    /// Logic groups point at conditions, indicators point at outputs.
    ChildKinds,
    /// Start has a single root condition.
    SingleRoot,
    /// Indicator payloads are usable by the engine.
    Payload,
}

/// A single diagnostic produced by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    #[error("The graph has no Start node")]
    MissingStart,

    #[error("The graph has more than one Start node: {}", .node_ids.join(", "))]
    MultipleStarts { node_ids: Vec<String> },

    #[error("The graph has no Output node")]
    MissingOutput,

    #[error("Node '{node_id}' is part of a cycle")]
    CycleDetected { node_id: String },

    #[error("Node '{node_id}' has no incoming edge")]
    MissingIncoming { node_id: String },

    #[error("Node '{node_id}' has no outgoing edge")]
    MissingOutgoing { node_id: String },

    #[error("Node '{node_id}' cannot be reached from the Start node")]
    UnreachableNode { node_id: String },

    #[error("Logic group '{group_id}' points at {child_kind} node '{child_id}'")]
    IllegalLogicGroupChild {
        group_id: String,
        child_id: String,
        child_kind: NodeKind,
    },

    #[error("Indicator '{indicator_id}' points at {child_kind} node '{child_id}', only Output is allowed")]
    IllegalIndicatorChild {
        indicator_id: String,
        child_id: String,
        child_kind: NodeKind,
    },

    #[error("Output '{output_id}' has an outgoing edge to '{child_id}', outputs must be terminal")]
    IllegalOutputEdge { output_id: String, child_id: String },

    #[error("Start node '{start_id}' connects directly to Output '{output_id}' without any condition")]
    StartTargetsOutput { start_id: String, output_id: String },

    #[error(
        "Start node '{start_id}' has {} root conditions ({}), only one is supported",
        .root_ids.len(),
        .root_ids.join(", ")
    )]
    MultipleRootsUnsupported {
        start_id: String,
        root_ids: Vec<String>,
    },

    #[error("Indicator '{node_id}' has a period of 0")]
    InvalidPeriod { node_id: String },

    #[error("Indicator '{node_id}' has a non-finite threshold")]
    NonFiniteThreshold { node_id: String },
}

impl StructuralViolation {
    pub fn invariant(&self) -> Invariant {
        match self {
            Self::MissingStart | Self::MultipleStarts { .. } | Self::MissingOutput => {
                Invariant::Terminals
            }
            Self::CycleDetected { .. } => Invariant::Acyclic,
            Self::MissingIncoming { .. }
            | Self::MissingOutgoing { .. }
            | Self::UnreachableNode { .. } => Invariant::Connectivity,
            Self::IllegalLogicGroupChild { .. }
            | Self::IllegalIndicatorChild { .. }
            | Self::IllegalOutputEdge { .. }
            | Self::StartTargetsOutput { .. } => Invariant::ChildKinds,
            Self::MultipleRootsUnsupported { .. } => Invariant::SingleRoot,
            Self::InvalidPeriod { .. } | Self::NonFiniteThreshold { .. } => Invariant::Payload,
        }
    }

    /// Ids of the nodes this violation is about.
    pub fn node_ids(&self) -> Vec<&str> {
        match self {
            Self::MissingStart | Self::MissingOutput => Vec::new(),
            Self::MultipleStarts { node_ids } => node_ids.iter().map(String::as_str).collect(),
            Self::CycleDetected { node_id }
            | Self::MissingIncoming { node_id }
            | Self::MissingOutgoing { node_id }
            | Self::UnreachableNode { node_id }
            | Self::InvalidPeriod { node_id }
            | Self::NonFiniteThreshold { node_id } => vec![node_id.as_str()],
            Self::IllegalLogicGroupChild {
                group_id, child_id, ..
            } => vec![group_id.as_str(), child_id.as_str()],
            Self::IllegalIndicatorChild {
                indicator_id,
                child_id,
                ..
            } => vec![indicator_id.as_str(), child_id.as_str()],
            Self::IllegalOutputEdge {
                output_id,
                child_id,
            } => vec![output_id.as_str(), child_id.as_str()],
            Self::StartTargetsOutput {
                start_id,
                output_id,
            } => vec![start_id.as_str(), output_id.as_str()],
            Self::MultipleRootsUnsupported { start_id, root_ids } => {
                std::iter::once(start_id.as_str())
                    .chain(root_ids.iter().map(String::as_str))
                    .collect()
            }
        }
    }
}
