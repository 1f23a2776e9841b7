use crate::error::ResponseError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Decoded reply of a strategy validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub symbol: String,
    pub timeframe: String,
    pub valid: bool,
    /// `(logic block index as reported by the engine, block result)`, in reply order.
    pub per_group_results: Vec<(usize, bool)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A trade executed by the backtest engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub price: f64,
    pub quantity: f64,
    pub side: TradeSide,
    pub pnl: f64,
}

/// Decoded reply of a backtest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub symbol: String,
    pub executed_trades: Vec<Trade>,
}

impl BacktestOutcome {
    pub fn total_pnl(&self) -> f64 {
        self.executed_trades.iter().map(|t| t.pnl).sum()
    }
}

#[derive(Deserialize)]
struct RawValidation {
    symbol: String,
    timeframe: String,
    valid: bool,
    results: Vec<RawBlockResult>,
}

#[derive(Deserialize)]
struct RawBlockResult {
    logic_block: usize,
    result: bool,
}

/// Error body returned instead of a result (`{"error": ..}` or `{"detail": ..}`).
///
/// A body carrying any other field is a broken reply, not an envelope.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorEnvelope {
    #[serde(alias = "detail")]
    error: serde_json::Value,
}

pub fn parse_validation_response(raw: &str) -> Result<ValidationOutcome, ResponseError> {
    let decoded: RawValidation = decode("validation", raw)?;
    Ok(ValidationOutcome {
        symbol: decoded.symbol,
        timeframe: decoded.timeframe,
        valid: decoded.valid,
        per_group_results: decoded
            .results
            .into_iter()
            .map(|r| (r.logic_block, r.result))
            .collect(),
    })
}

/// Decodes a backtest reply. Any malformed trade rejects the whole reply.
pub fn parse_backtest_response(raw: &str) -> Result<BacktestOutcome, ResponseError> {
    decode("backtest", raw)
}

/// Decodes `raw` into `T`, telling engine rejections apart from malformed bodies.
pub(crate) fn decode<T: DeserializeOwned>(
    payload: &'static str,
    raw: &str,
) -> Result<T, ResponseError> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            let envelope = serde_json::from_str::<ErrorEnvelope>(raw)
                .ok()
                .filter(|e| !e.error.is_null());
            if let Some(envelope) = envelope {
                let message = match envelope.error {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                warn!(payload, %message, "engine rejected request");
                return Err(ResponseError::Rejected { payload, message });
            }
            warn!(payload, error = %err, "malformed response");
            Err(ResponseError::Malformed {
                payload,
                reason: err.to_string(),
            })
        }
    }
}
