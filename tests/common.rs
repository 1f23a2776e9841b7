//! Common test utilities for building strategy graphs.
use signalflow::prelude::*;

#[allow(dead_code)]
pub fn ema(period: u32, value: f64) -> IndicatorPayload {
    IndicatorPayload::new(IndicatorType::Ema, period, ComparisonOp::GreaterThan, value)
}

#[allow(dead_code)]
pub fn rsi(period: u32, value: f64) -> IndicatorPayload {
    IndicatorPayload::new(IndicatorType::Rsi, period, ComparisonOp::LessThan, value)
}

/// `Start -> EMA(20) > 1000 -> Output`
#[allow(dead_code)]
pub fn create_single_indicator_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph.add_node(Node::indicator("ema", ema(20, 1000.0))).unwrap();
    graph.add_node(Node::output("output")).unwrap();
    graph.connect("start", "ema").unwrap();
    graph.connect("ema", "output").unwrap();
    graph
}

/// `Start -> AND[EMA(20) > 1000, RSI(14) < 30] -> Output`
#[allow(dead_code)]
pub fn create_and_group_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph
        .add_node(Node::logic_group("group", LogicOperator::And))
        .unwrap();
    graph.add_node(Node::indicator("ema", ema(20, 1000.0))).unwrap();
    graph.add_node(Node::indicator("rsi", rsi(14, 30.0))).unwrap();
    graph.add_node(Node::output("output")).unwrap();
    graph.connect("start", "group").unwrap();
    graph.connect("group", "ema").unwrap();
    graph.connect("group", "rsi").unwrap();
    graph.connect("ema", "output").unwrap();
    graph.connect("rsi", "output").unwrap();
    graph
}

/// `Start -> AND[EMA(50) > 2000, OR[RSI(14) < 30, MACD(26) >= 0]] -> Output`
#[allow(dead_code)]
pub fn create_nested_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph
        .add_node(Node::logic_group("all", LogicOperator::And))
        .unwrap();
    graph
        .add_node(Node::logic_group("any", LogicOperator::Or))
        .unwrap();
    graph.add_node(Node::indicator("ema", ema(50, 2000.0))).unwrap();
    graph.add_node(Node::indicator("rsi", rsi(14, 30.0))).unwrap();
    graph
        .add_node(Node::indicator(
            "macd",
            IndicatorPayload::new(
                IndicatorType::Macd,
                26,
                ComparisonOp::GreaterThanOrEqual,
                0.0,
            ),
        ))
        .unwrap();
    graph.add_node(Node::output("output")).unwrap();
    graph.connect("start", "all").unwrap();
    graph.connect("all", "ema").unwrap();
    graph.connect("all", "any").unwrap();
    graph.connect("any", "rsi").unwrap();
    graph.connect("any", "macd").unwrap();
    for indicator in ["ema", "rsi", "macd"] {
        graph.connect(indicator, "output").unwrap();
    }
    graph
}

/// `Start -> A(AND) -> B(OR) -> A`, with an indicator under B so every
/// node keeps an outgoing edge.
#[allow(dead_code)]
pub fn create_cyclic_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph
        .add_node(Node::logic_group("a", LogicOperator::And))
        .unwrap();
    graph
        .add_node(Node::logic_group("b", LogicOperator::Or))
        .unwrap();
    graph.add_node(Node::indicator("ema", ema(20, 1000.0))).unwrap();
    graph.add_node(Node::output("output")).unwrap();
    graph.connect("start", "a").unwrap();
    graph.connect("a", "b").unwrap();
    graph.connect("b", "a").unwrap();
    graph.connect("b", "ema").unwrap();
    graph.connect("ema", "output").unwrap();
    graph
}

/// Asserts no edge points at a node that does not exist.
#[allow(dead_code)]
pub fn assert_no_dangling_edges(graph: &Graph) {
    for edge in graph.edges() {
        assert!(
            graph.contains_node(&edge.source) && graph.contains_node(&edge.target),
            "edge '{}' ({} -> {}) is dangling",
            edge.id,
            edge.source,
            edge.target
        );
    }
}

/// `Start -> g0 -> g1 -> ... -> g{depth-1} -> EMA(20) > 1000 -> Output`,
/// alternating AND and OR groups.
#[allow(dead_code)]
pub fn create_deep_chain_graph(depth: usize) -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph.add_node(Node::indicator("ema", ema(20, 1000.0))).unwrap();
    graph.add_node(Node::output("output")).unwrap();

    let mut previous = "start".to_string();
    for i in 0..depth {
        let id = format!("g{}", i);
        let operator = if i % 2 == 0 {
            LogicOperator::And
        } else {
            LogicOperator::Or
        };
        graph.add_node(Node::logic_group(id.clone(), operator)).unwrap();
        graph.connect(&previous, &id).unwrap();
        previous = id;
    }
    graph.connect(&previous, "ema").unwrap();
    graph.connect("ema", "output").unwrap();
    graph
}
