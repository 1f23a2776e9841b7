//! Assembly of the outbound strategy requests and decoding of the engine's replies.
//!
//! Nothing here performs network I/O; the transport collaborator sends the
//! serialized requests and hands the raw reply bodies back for decoding.

mod lowering;
mod response;

pub use lowering::{LogicBlock, lower_to_blocks};
pub use response::{
    BacktestOutcome, Trade, TradeSide, ValidationOutcome, parse_backtest_response,
    parse_validation_response,
};
pub(crate) use response::decode as decode_payload;

use crate::ast::ConditionTree;
use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which market the strategy is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    pub symbol: String,
    pub market_type: String,
    pub exchange: String,
    pub timeframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candles: Option<u32>,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            market_type: "spot".to_string(),
            exchange: "okx".to_string(),
            timeframe: "1h".to_string(),
            candles: Some(100),
        }
    }
}

impl MarketParams {
    pub fn validate(&self) -> Result<(), RequestError> {
        for (field, value) in [
            ("symbol", &self.symbol),
            ("market_type", &self.market_type),
            ("exchange", &self.exchange),
            ("timeframe", &self.timeframe),
        ] {
            if value.trim().is_empty() {
                return Err(RequestError::InvalidMarketParam {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.candles == Some(0) {
            return Err(RequestError::InvalidMarketParam {
                field: "candles",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

/// Order simulation settings for a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderParams {
    pub order_type: OrderType,
    pub quantity: f64,
    pub slippage_bps: f64,
    pub fee_bps: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for OrderParams {
    fn default() -> Self {
        Self {
            order_type: OrderType::Market,
            quantity: 1.0,
            slippage_bps: 5.0,
            fee_bps: 10.0,
            stop_loss_pct: 5.0,
            take_profit_pct: 10.0,
        }
    }
}

impl OrderParams {
    pub fn validate(&self) -> Result<(), RequestError> {
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return Err(RequestError::InvalidOrderParam {
                field: "quantity",
                reason: format!("must be a positive number, got {}", self.quantity),
            });
        }
        for (field, value) in [
            ("slippage_bps", self.slippage_bps),
            ("fee_bps", self.fee_bps),
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RequestError::InvalidOrderParam {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// Body of a strategy validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRequest {
    #[serde(flatten)]
    pub market: MarketParams,
    pub conditions: Vec<LogicBlock>,
    pub condition_tree: ConditionTree,
}

/// Body of a backtest call: a strategy request plus order settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    #[serde(flatten)]
    pub strategy: StrategyRequest,
    #[serde(flatten)]
    pub order: OrderParams,
}

pub fn build_strategy_request(
    market: MarketParams,
    tree: ConditionTree,
) -> Result<StrategyRequest, RequestError> {
    market.validate()?;
    let conditions = lower_to_blocks(&tree)?;
    debug!(
        symbol = %market.symbol,
        blocks = conditions.len(),
        "built strategy request"
    );
    Ok(StrategyRequest {
        market,
        conditions,
        condition_tree: tree,
    })
}

pub fn build_backtest_request(
    market: MarketParams,
    order: OrderParams,
    tree: ConditionTree,
) -> Result<BacktestRequest, RequestError> {
    order.validate()?;
    let strategy = build_strategy_request(market, tree)?;
    Ok(BacktestRequest { strategy, order })
}

impl StrategyRequest {
    pub fn to_json(&self) -> Result<String, RequestError> {
        serde_json::to_string_pretty(self).map_err(|e| RequestError::Serialization(e.to_string()))
    }
}

impl BacktestRequest {
    pub fn to_json(&self) -> Result<String, RequestError> {
        serde_json::to_string_pretty(self).map_err(|e| RequestError::Serialization(e.to_string()))
    }
}
