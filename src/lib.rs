//! # Signalflow - Strategy Graph Compilation
//!
//! **Signalflow** turns a visually assembled trading-strategy graph (indicator
//! nodes combined by AND/OR logic groups) into the canonical condition tree an
//! external execution/backtest engine consumes.
//!
//! ## Core Workflow
//!
//! 1.  **Edit**: Build or load a [`graph::Graph`] and mutate it through its
//!     discrete operations (`add_node`, `connect`, `remove_node`, ...).
//! 2.  **Validate**: Run the [`validator::Validator`]. Every structural
//!     violation is reported at once.
//! 3.  **Compile**: Turn a valid graph into an [`ast::ConditionTree`] with the
//!     [`compiler::Compiler`].
//! 4.  **Request**: Embed the tree into a strategy or backtest request with the
//!     builders in [`request`], and decode the engine's replies there too.
//!
//! ## Quick Start
//!
//! ```rust
//! use signalflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut graph = Graph::new();
//!     graph.add_node(Node::start("start"))?;
//!     graph.add_node(Node::logic_group("all", LogicOperator::And))?;
//!     graph.add_node(Node::indicator(
//!         "ema",
//!         IndicatorPayload::new(IndicatorType::Ema, 20, ComparisonOp::GreaterThan, 1000.0),
//!     ))?;
//!     graph.add_node(Node::indicator(
//!         "rsi",
//!         IndicatorPayload::new(IndicatorType::Rsi, 14, ComparisonOp::LessThan, 30.0),
//!     ))?;
//!     graph.add_node(Node::output("buy"))?;
//!     graph.connect("start", "all")?;
//!     graph.connect("all", "ema")?;
//!     graph.connect("all", "rsi")?;
//!     graph.connect("ema", "buy")?;
//!     graph.connect("rsi", "buy")?;
//!
//!     assert!(validate(&graph).is_valid());
//!
//!     let tree = compile(&graph)?;
//!     println!("{}", ConditionFormatter::format_inline(&tree));
//!
//!     let request = build_backtest_request(MarketParams::default(), OrderParams::default(), tree)?;
//!     println!("{}", request.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod market;
pub mod metrics;
pub mod prelude;
pub mod render;
pub mod request;
pub mod store;
pub mod validator;
