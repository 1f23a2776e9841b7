//! Payloads of the display-only performance metrics collaborator.
//!
//! The statistics are computed remotely; this module only assembles the
//! request and decodes the fixed record that comes back.

use crate::error::{RequestError, ResponseError};
use crate::request::decode_payload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsTrade {
    pub pnl: f64,
    pub duration_hours: f64,
    pub notional: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRequest {
    pub starting_balance: f64,
    pub trades: Vec<MetricsTrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_returns: Option<Vec<f64>>,
}

impl MetricsRequest {
    pub fn new(starting_balance: f64, trades: Vec<MetricsTrade>) -> Self {
        Self {
            starting_balance,
            trades,
            benchmark_returns: None,
        }
    }

    pub fn with_benchmark(mut self, returns: Vec<f64>) -> Self {
        self.benchmark_returns = Some(returns);
        self
    }

    /// Rejects requests the collaborator would answer with an error body.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !(self.starting_balance.is_finite() && self.starting_balance > 0.0) {
            return Err(RequestError::InvalidMetricsParam {
                field: "starting_balance",
                reason: format!("must be a positive number, got {}", self.starting_balance),
            });
        }
        if self.trades.is_empty() {
            return Err(RequestError::InvalidMetricsParam {
                field: "trades",
                reason: "at least one trade is required".to_string(),
            });
        }
        Ok(())
    }
}

/// The fixed record of performance statistics shown next to a backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub pnl_pct: f64,
    #[serde(rename = "pnl_$")]
    pub pnl_abs: f64,
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown_pct: f64,
    #[serde(rename = "max_drawdown_$")]
    pub max_drawdown_abs: f64,
    pub volatility_pct: f64,
    pub total_trades: u64,
    pub win_rate_pct: f64,
    pub avg_trade_duration_hr: f64,
    pub largest_win_pct: f64,
    pub largest_loss_pct: f64,
    pub turnover_pct: f64,
    pub value_at_risk_95: f64,
    pub leverage_estimate: f64,
    #[serde(default)]
    pub beta_to_benchmark: Option<f64>,
}

pub fn parse_metrics_response(raw: &str) -> Result<MetricsReport, ResponseError> {
    decode_payload("metrics", raw)
}
