//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! signalflow crate.
//!
//! # Example
//!
//! ```rust
//! use signalflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let graph = Graph::default_template();
//! let tree = compile(&graph)?;
//! assert_eq!(ConditionFormatter::format_inline(&tree), "EMA(20) > 100");
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```

// Graph model
pub use crate::graph::{
    ComparisonOp, Edge, FlowSnapshot, Graph, IndicatorPayload, IndicatorType, IntoGraph,
    LogicOperator, Node, NodeKind, NodePayload, Position, Revisioned,
};

// Validation and compilation
pub use crate::compiler::{Compiler, compile};
pub use crate::validator::{RootPolicy, StructuralViolation, ValidationResult, Validator, validate};

// Condition tree
pub use crate::ast::{AtomicCondition, ConditionTree, DisplayTree, IndicatorSpec, LogicNode};
pub use crate::render::ConditionFormatter;

// Requests and responses
pub use crate::request::{
    BacktestOutcome, BacktestRequest, MarketParams, OrderParams, OrderType, StrategyRequest,
    Trade, TradeSide, ValidationOutcome, build_backtest_request, build_strategy_request,
    parse_backtest_response, parse_validation_response,
};

// Error types
pub use crate::error::{CompileError, GraphError, RequestError, ResponseError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
