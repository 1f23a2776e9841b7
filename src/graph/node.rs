use serde::{Deserialize, Serialize};
use std::fmt;

/// The indicator families understood by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorType {
    Ema,
    Rsi,
    Macd,
}

impl IndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Ema => "EMA",
            IndicatorType::Rsi => "RSI",
            IndicatorType::Macd => "MACD",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied between an indicator's latest value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "==")]
    Equal,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::LessThan => "<",
            ComparisonOp::GreaterThanOrEqual => ">=",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::Equal => "==",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean combinator of a logic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of an indicator node: `<type>(<period>) <operator> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPayload {
    pub indicator: IndicatorType,
    pub period: u32,
    pub operator: ComparisonOp,
    pub value: f64,
}

impl IndicatorPayload {
    pub fn new(indicator: IndicatorType, period: u32, operator: ComparisonOp, value: f64) -> Self {
        Self {
            indicator,
            period,
            operator,
            value,
        }
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Indicator,
    LogicGroup,
    Output,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Start => "Start",
            NodeKind::Indicator => "Indicator",
            NodeKind::LogicGroup => "LogicGroup",
            NodeKind::Output => "Output",
        };
        f.write_str(name)
    }
}

/// Kind-specific data carried by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodePayload {
    Start,
    Indicator(IndicatorPayload),
    LogicGroup { operator: LogicOperator },
    Output,
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Start => NodeKind::Start,
            NodePayload::Indicator(_) => NodeKind::Indicator,
            NodePayload::LogicGroup { .. } => NodeKind::LogicGroup,
            NodePayload::Output => NodeKind::Output,
        }
    }
}

/// Canvas coordinates. Presentation only, ignored by validation and compilation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single node of a strategy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub data: NodePayload,
    #[serde(default)]
    pub position: Position,
}

impl Node {
    pub fn new(id: impl Into<String>, data: NodePayload) -> Self {
        Self {
            id: id.into(),
            data,
            position: Position::default(),
        }
    }

    pub fn start(id: impl Into<String>) -> Self {
        Self::new(id, NodePayload::Start)
    }

    pub fn output(id: impl Into<String>) -> Self {
        Self::new(id, NodePayload::Output)
    }

    pub fn indicator(id: impl Into<String>, payload: IndicatorPayload) -> Self {
        Self::new(id, NodePayload::Indicator(payload))
    }

    pub fn logic_group(id: impl Into<String>, operator: LogicOperator) -> Self {
        Self::new(id, NodePayload::LogicGroup { operator })
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_wire_spelling() {
        let node = Node::indicator(
            "2",
            IndicatorPayload::new(IndicatorType::Ema, 20, ComparisonOp::GreaterThan, 100.0),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["data"]["type"], "indicator");
        assert_eq!(json["data"]["indicator"], "EMA");
        assert_eq!(json["data"]["operator"], ">");

        let group = Node::logic_group("g", LogicOperator::Or);
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["data"]["type"], "logicGroup");
        assert_eq!(json["data"]["operator"], "OR");
    }

    #[test]
    fn position_defaults_when_absent() {
        let node: Node = serde_json::from_str(r#"{"id":"1","data":{"type":"start"}}"#).unwrap();
        assert_eq!(node.kind(), NodeKind::Start);
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let raw = r#"{"id":"2","data":{"type":"indicator","indicator":"EMA","period":20,"operator":"!=","value":1.0}}"#;
        assert!(serde_json::from_str::<Node>(raw).is_err());
    }
}
