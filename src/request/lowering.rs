use crate::ast::{AtomicCondition, ConditionTree, LogicNode};
use crate::error::RequestError;
use crate::graph::LogicOperator;
use serde::{Deserialize, Serialize};

/// One entry of the engine's `conditions` list.
///
/// The engine evaluates each block with its own operator and ANDs the blocks
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicBlock {
    pub logic_operator: LogicOperator,
    pub conditions: Vec<AtomicCondition>,
}

impl LogicBlock {
    fn single(condition: &AtomicCondition) -> Self {
        Self {
            logic_operator: LogicOperator::And,
            conditions: vec![*condition],
        }
    }
}

/// Lowers a condition tree into the two-level block list the engine accepts.
///
/// Single-child groups have the value of their child and are collapsed at
/// every level before the shape is checked.
pub fn lower_to_blocks(tree: &ConditionTree) -> Result<Vec<LogicBlock>, RequestError> {
    let blocks = match collapse(tree) {
        ConditionTree::Atomic(atomic) => vec![LogicBlock::single(atomic)],
        ConditionTree::Logic(node) => lower_logic(node)?,
    };

    if let Some(index) = blocks.iter().position(|b| b.conditions.is_empty()) {
        return Err(RequestError::EmptyBlock(index));
    }
    Ok(blocks)
}

/// Skips any chain of single-child groups above `tree`.
fn collapse(mut tree: &ConditionTree) -> &ConditionTree {
    while let ConditionTree::Logic(LogicNode { children, .. }) = tree {
        match children.as_slice() {
            [only] => tree = only,
            _ => break,
        }
    }
    tree
}

fn lower_logic(node: &LogicNode) -> Result<Vec<LogicBlock>, RequestError> {
    if let Some(conditions) = flat_conditions(node) {
        return Ok(vec![LogicBlock {
            logic_operator: node.operator,
            conditions,
        }]);
    }
    if node.operator == LogicOperator::Or {
        return Err(RequestError::UnrepresentableTree(
            "an OR over nested groups has no block equivalent".to_string(),
        ));
    }

    node.children
        .iter()
        .map(|child| {
            let inner = collapse(child);
            match inner {
                ConditionTree::Atomic(atomic) => Ok(LogicBlock::single(atomic)),
                ConditionTree::Logic(group) => flat_conditions(group)
                    .map(|conditions| LogicBlock {
                        logic_operator: group.operator,
                        conditions,
                    })
                    .ok_or_else(|| {
                        // The parent group is one level and `inner` carries
                        // the rest, so its depth is the group nesting.
                        RequestError::UnrepresentableTree(format!(
                            "groups nested {} levels deep are not supported",
                            inner.depth()
                        ))
                    }),
            }
        })
        .collect()
}

/// The group's children, with single-child wrappers collapsed, if every one
/// of them is atomic.
fn flat_conditions(node: &LogicNode) -> Option<Vec<AtomicCondition>> {
    node.children
        .iter()
        .map(|child| match collapse(child) {
            ConditionTree::Atomic(atomic) => Some(*atomic),
            ConditionTree::Logic(_) => None,
        })
        .collect()
}
