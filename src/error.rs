use crate::graph::NodeKind;
use crate::validator::StructuralViolation;
use itertools::Itertools;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by local mutations of the graph model.
///
/// These only cover local constraints. Global structural rules are reported
/// by the validator as [`StructuralViolation`]s instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("A node with id '{0}' already exists")]
    DuplicateNode(String),

    #[error("An edge with id '{0}' already exists")]
    DuplicateEdge(String),

    #[error("Node '{0}' does not exist in the graph")]
    UnknownNode(String),

    #[error("Edge '{0}' does not exist in the graph")]
    UnknownEdge(String),

    #[error("Node '{node_id}' is a {found} node, but the edit requires a {expected} node")]
    KindMismatch {
        node_id: String,
        expected: NodeKind,
        found: NodeKind,
    },
}

/// Errors that can occur during the condition compilation phase.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(
        "Compilation refused, the graph has {} structural violation(s):\n{}",
        .violations.len(),
        .violations.iter().join("\n")
    )]
    NotValidated { violations: Vec<StructuralViolation> },

    #[error("Internal inconsistency at node '{node_id}': {reason}")]
    Inconsistent { node_id: String, reason: String },
}

/// Errors that can occur while assembling an outbound strategy request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("The condition tree cannot be expressed as logic blocks: {0}")]
    UnrepresentableTree(String),

    #[error("Logic block {0} has no conditions")]
    EmptyBlock(usize),

    #[error("Invalid market parameter '{field}': {reason}")]
    InvalidMarketParam { field: &'static str, reason: String },

    #[error("Invalid order parameter '{field}': {reason}")]
    InvalidOrderParam { field: &'static str, reason: String },

    #[error("Invalid metrics parameter '{field}': {reason}")]
    InvalidMetricsParam { field: &'static str, reason: String },

    #[error("Failed to serialize request: {0}")]
    Serialization(String),
}

/// Errors raised while decoding a payload returned by the execution engine
/// or one of its display collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("Malformed {payload} response: {reason}")]
    Malformed {
        payload: &'static str,
        reason: String,
    },

    #[error("The engine rejected the {payload} request: {message}")]
    Rejected {
        payload: &'static str,
        message: String,
    },
}

/// Errors raised while decoding string-encoded market data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("Candle row {row} has {found} columns, at least 6 are required")]
    ShortRow { row: usize, found: usize },

    #[error("Candle row {row} has an invalid {column} value '{value}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Failed to parse candle payload: {0}")]
    Envelope(String),
}

/// Errors raised by a [`crate::store::FlowStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access flow file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored flow is not valid JSON: {0}")]
    Format(String),
}

/// Errors raised while loading a run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error(transparent)]
    Invalid(#[from] RequestError),
}
