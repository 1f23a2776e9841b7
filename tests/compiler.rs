//! Tests for compiling validated graphs into condition trees.
mod common;
use common::*;
use signalflow::prelude::*;

fn ema_tree(period: u32, value: f64) -> ConditionTree {
    ConditionTree::atomic(IndicatorType::Ema, period, ComparisonOp::GreaterThan, value)
}

fn rsi_tree(period: u32, value: f64) -> ConditionTree {
    ConditionTree::atomic(IndicatorType::Rsi, period, ComparisonOp::LessThan, value)
}

#[test]
fn test_single_indicator_has_no_wrapping_group() {
    let tree = compile(&create_single_indicator_graph()).expect("Failed to compile");
    assert_eq!(tree, ema_tree(20, 1000.0));
}

#[test]
fn test_and_group_keeps_edge_order() {
    let tree = compile(&create_and_group_graph()).expect("Failed to compile");
    assert_eq!(
        tree,
        ConditionTree::logic(
            LogicOperator::And,
            vec![ema_tree(20, 1000.0), rsi_tree(14, 30.0)]
        )
    );
}

#[test]
fn test_reordered_edges_reorder_children() {
    let mut graph = create_and_group_graph();
    graph.remove_edge("egroup-ema").unwrap();
    graph.connect("group", "ema").unwrap();

    let tree = compile(&graph).unwrap();
    assert_eq!(
        tree,
        ConditionTree::logic(
            LogicOperator::And,
            vec![rsi_tree(14, 30.0), ema_tree(20, 1000.0)]
        )
    );
}

#[test]
fn test_single_child_group_is_kept() {
    let mut graph = Graph::new();
    graph.add_node(Node::start("start")).unwrap();
    graph
        .add_node(Node::logic_group("only", LogicOperator::Or))
        .unwrap();
    graph.add_node(Node::indicator("ema", ema(20, 1000.0))).unwrap();
    graph.add_node(Node::output("output")).unwrap();
    graph.connect("start", "only").unwrap();
    graph.connect("only", "ema").unwrap();
    graph.connect("ema", "output").unwrap();

    let tree = compile(&graph).expect("single-child groups are allowed");
    match &tree {
        ConditionTree::Logic(node) => {
            assert_eq!(node.operator, LogicOperator::Or);
            assert_eq!(node.children, vec![ema_tree(20, 1000.0)]);
        }
        other => panic!("Expected a logic node, got {:?}", other),
    }
}

#[test]
fn test_nested_groups() {
    let tree = compile(&create_nested_graph()).unwrap();
    assert_eq!(tree.depth(), 3);
    assert_eq!(
        ConditionFormatter::format_inline(&tree),
        "EMA(50) > 2000 AND (RSI(14) < 30 OR MACD(26) >= 0)"
    );
}

#[test]
fn test_shared_indicator_appears_under_each_parent() {
    let mut graph = create_and_group_graph();
    graph
        .add_node(Node::logic_group("alt", LogicOperator::Or))
        .unwrap();
    graph.connect("group", "alt").unwrap();
    graph.connect("alt", "ema").unwrap();
    graph.connect("alt", "rsi").unwrap();

    let tree = compile(&graph).unwrap();
    assert_eq!(tree.atomics().len(), 4);
}

#[test]
fn test_invalid_graph_is_refused_with_all_violations() {
    let mut graph = create_cyclic_graph();
    graph.remove_node("output").unwrap();

    match compile(&graph) {
        Err(CompileError::NotValidated { violations }) => {
            assert!(violations.contains(&StructuralViolation::MissingOutput));
            assert!(
                violations
                    .iter()
                    .any(|v| matches!(v, StructuralViolation::CycleDetected { .. }))
            );
        }
        other => panic!("Expected NotValidated, got {:?}", other),
    }
}

#[test]
fn test_multiple_roots_policy() {
    let mut graph = create_single_indicator_graph();
    graph.add_node(Node::indicator("rsi", rsi(14, 30.0))).unwrap();
    graph.connect("start", "rsi").unwrap();
    graph.connect("rsi", "output").unwrap();

    assert!(matches!(
        compile(&graph),
        Err(CompileError::NotValidated { .. })
    ));

    let tree = Compiler::builder(&graph)
        .root_policy(RootPolicy::ImplicitOr)
        .build()
        .compile()
        .expect("implicit OR accepts several roots");
    assert_eq!(
        tree,
        ConditionTree::logic(
            LogicOperator::Or,
            vec![ema_tree(20, 1000.0), rsi_tree(14, 30.0)]
        )
    );
}

#[test]
fn test_deep_group_chain_compiles() {
    let graph = create_deep_chain_graph(10_000);
    assert!(validate(&graph).is_valid());

    let tree = compile(&graph).expect("deep chains must compile");
    assert_eq!(tree.depth(), 10_001);
    assert_eq!(tree.atomics(), vec![&AtomicCondition::from(&ema(20, 1000.0))]);

    // Every level is a single-child wrapper, so the engine sees one condition.
    let blocks = signalflow::request::lower_to_blocks(&tree).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].conditions.len(), 1);
}

#[test]
fn test_deep_cycle_is_reported() {
    let mut graph = create_deep_chain_graph(10_000);
    graph.connect("g9999", "g0").unwrap();

    let violations = validate(&graph).violations().to_vec();
    assert_eq!(
        violations,
        vec![StructuralViolation::CycleDetected {
            node_id: "g0".to_string()
        }]
    );
}

#[test]
fn test_compile_is_deterministic() {
    let graph = create_nested_graph();
    let first = compile(&graph).unwrap();
    let second = compile(&graph).unwrap();
    assert_eq!(first, second);

    let reloaded = graph.to_snapshot().into_graph().unwrap();
    assert_eq!(compile(&reloaded).unwrap(), first);
}

#[test]
fn test_compiled_tree_wire_format() {
    let tree = compile(&create_and_group_graph()).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "operator": "AND",
            "children": [
                {"indicator": {"type": "EMA", "period": 20}, "operator": ">", "value": 1000.0},
                {"indicator": {"type": "RSI", "period": 14}, "operator": "<", "value": 30.0}
            ]
        })
    );
}

#[test]
fn test_tree_display() {
    let tree = compile(&create_nested_graph()).unwrap();
    let rendered = DisplayTree { tree: &tree }.to_string();
    assert!(rendered.starts_with("└── AND\n"));
    assert!(rendered.contains("MACD(26) >= 0"));
}
