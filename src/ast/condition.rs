use crate::graph::{ComparisonOp, IndicatorPayload, IndicatorType, LogicOperator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator reference as the engine expects it: `{"type": "EMA", "period": 20}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorSpec {
    #[serde(rename = "type")]
    pub kind: IndicatorType,
    pub period: u32,
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.period)
    }
}

/// A single indicator / operator / threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtomicCondition {
    pub indicator: IndicatorSpec,
    pub operator: ComparisonOp,
    pub value: f64,
}

impl From<&IndicatorPayload> for AtomicCondition {
    fn from(payload: &IndicatorPayload) -> Self {
        Self {
            indicator: IndicatorSpec {
                kind: payload.indicator,
                period: payload.period,
            },
            operator: payload.operator,
            value: payload.value,
        }
    }
}

impl fmt::Display for AtomicCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.indicator,
            self.operator,
            format_number(self.value)
        )
    }
}

/// An AND/OR combination of child conditions, in edge creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicNode {
    pub operator: LogicOperator,
    pub children: Vec<ConditionTree>,
}

/// The compiled condition structure consumed by the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionTree {
    Logic(LogicNode),
    Atomic(AtomicCondition),
}

impl ConditionTree {
    pub fn logic(operator: LogicOperator, children: Vec<ConditionTree>) -> Self {
        ConditionTree::Logic(LogicNode { operator, children })
    }

    pub fn atomic(kind: IndicatorType, period: u32, operator: ComparisonOp, value: f64) -> Self {
        ConditionTree::Atomic(AtomicCondition {
            indicator: IndicatorSpec { kind, period },
            operator,
            value,
        })
    }

    /// Number of levels, an atomic condition has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((tree, level)) = pending.pop() {
            deepest = deepest.max(level);
            if let ConditionTree::Logic(node) = tree {
                pending.extend(node.children.iter().map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    /// All atomic conditions, left to right.
    pub fn atomics(&self) -> Vec<&AtomicCondition> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                ConditionTree::Atomic(atomic) => out.push(atomic),
                ConditionTree::Logic(node) => pending.extend(node.children.iter().rev()),
            }
        }
        out
    }
}

// Dropping a deeply nested tree must not recurse once per level.
impl Drop for LogicNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            if let ConditionTree::Logic(node) = &mut child {
                pending.append(&mut node.children);
            }
        }
    }
}

/// Formats whole numbers without a fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
