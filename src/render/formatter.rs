use crate::ast::ConditionTree;
use crate::graph::LogicOperator;

/// Formats condition trees into one-line, human-readable expressions.
pub struct ConditionFormatter;

impl ConditionFormatter {
    /// Format a condition tree, e.g. `EMA(20) > 1000 AND (RSI(14) < 30 OR MACD(9) > 0)`.
    pub fn format_inline(tree: &ConditionTree) -> String {
        Self::format_recursive(tree, 0)
    }

    /// Recursively formats the tree, adding parentheses only when necessary.
    fn format_recursive(tree: &ConditionTree, parent_precedence: u8) -> String {
        match tree {
            ConditionTree::Atomic(atomic) => atomic.to_string(),
            ConditionTree::Logic(node) => match node.children.as_slice() {
                // An empty group is the identity of its operator.
                [] => match node.operator {
                    LogicOperator::And => "true".to_string(),
                    LogicOperator::Or => "false".to_string(),
                },
                [only] => Self::format_recursive(only, parent_precedence),
                children => {
                    let precedence = Self::precedence(node.operator);
                    let separator = format!(" {} ", node.operator);
                    let body = children
                        .iter()
                        .map(|child| Self::format_recursive(child, precedence))
                        .collect::<Vec<_>>()
                        .join(&separator);
                    if precedence < parent_precedence {
                        format!("({})", body)
                    } else {
                        body
                    }
                }
            },
        }
    }

    fn precedence(operator: LogicOperator) -> u8 {
        match operator {
            LogicOperator::Or => 1,
            LogicOperator::And => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ComparisonOp, IndicatorType};

    fn ema() -> ConditionTree {
        ConditionTree::atomic(IndicatorType::Ema, 20, ComparisonOp::GreaterThan, 1000.0)
    }

    fn rsi() -> ConditionTree {
        ConditionTree::atomic(IndicatorType::Rsi, 14, ComparisonOp::LessThan, 30.0)
    }

    #[test]
    fn or_inside_and_is_parenthesised() {
        let tree = ConditionTree::logic(
            LogicOperator::And,
            vec![ema(), ConditionTree::logic(LogicOperator::Or, vec![rsi(), ema()])],
        );
        assert_eq!(
            ConditionFormatter::format_inline(&tree),
            "EMA(20) > 1000 AND (RSI(14) < 30 OR EMA(20) > 1000)"
        );
    }

    #[test]
    fn and_inside_or_needs_no_parentheses() {
        let tree = ConditionTree::logic(
            LogicOperator::Or,
            vec![ema(), ConditionTree::logic(LogicOperator::And, vec![rsi(), ema()])],
        );
        assert_eq!(
            ConditionFormatter::format_inline(&tree),
            "EMA(20) > 1000 OR RSI(14) < 30 AND EMA(20) > 1000"
        );
    }

    #[test]
    fn single_child_group_renders_its_child() {
        let tree = ConditionTree::logic(LogicOperator::And, vec![rsi()]);
        assert_eq!(ConditionFormatter::format_inline(&tree), "RSI(14) < 30");
    }
}
