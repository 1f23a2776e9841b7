//! Fail-closed decoding of the market data collaborator's string-encoded candles.

use crate::error::MarketDataError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One candle row as sent by the collaborator: timestamp (epoch millis),
/// open, high, low, close, volume, all as strings. Extra trailing columns are
/// ignored.
pub type RawCandle = Vec<String>;

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Deserialize)]
struct CandleEnvelope {
    data: Vec<RawCandle>,
}

/// Decodes every row or none: the first bad field rejects the batch.
pub fn decode_candles(rows: &[RawCandle]) -> Result<Vec<Candle>, MarketDataError> {
    rows.iter()
        .enumerate()
        .map(|(row, raw)| decode_row(row, raw))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!(error = %e, "rejected candle batch"))
}

/// Decodes the `{"data": [[...], ...]}` reply body.
pub fn parse_candle_response(raw: &str) -> Result<Vec<Candle>, MarketDataError> {
    let envelope: CandleEnvelope =
        serde_json::from_str(raw).map_err(|e| MarketDataError::Envelope(e.to_string()))?;
    decode_candles(&envelope.data)
}

fn decode_row(row: usize, raw: &RawCandle) -> Result<Candle, MarketDataError> {
    if raw.len() < COLUMNS.len() {
        return Err(MarketDataError::ShortRow {
            row,
            found: raw.len(),
        });
    }

    let timestamp = raw[0]
        .trim()
        .parse::<i64>()
        .map_err(|_| invalid(row, 0, &raw[0]))?;
    let mut values = [0.0; 5];
    for (i, value) in values.iter_mut().enumerate() {
        let column = i + 1;
        *value = raw[column]
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(row, column, &raw[column]))?;
    }
    let [open, high, low, close, volume] = values;

    Ok(Candle {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

fn invalid(row: usize, column: usize, value: &str) -> MarketDataError {
    MarketDataError::InvalidField {
        row,
        column: COLUMNS[column],
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> RawCandle {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn decodes_and_ignores_quote_volume() {
        let rows = vec![row(&[
            "1700000000000",
            "100.5",
            "101",
            "99.5",
            "100",
            "12.25",
            "1225.0",
        ])];
        let candles = decode_candles(&rows).unwrap();
        assert_eq!(candles[0].timestamp, 1_700_000_000_000);
        assert_eq!(candles[0].high, 101.0);
        assert_eq!(candles[0].volume, 12.25);
    }

    #[test]
    fn nan_rejects_the_whole_batch() {
        let rows = vec![
            row(&["1", "1", "1", "1", "1", "1"]),
            row(&["2", "1", "NaN", "1", "1", "1"]),
        ];
        assert_eq!(
            decode_candles(&rows),
            Err(MarketDataError::InvalidField {
                row: 1,
                column: "high",
                value: "NaN".to_string()
            })
        );
    }

    #[test]
    fn fractional_timestamp_is_invalid() {
        let rows = vec![row(&["1.5", "1", "1", "1", "1", "1"])];
        assert!(matches!(
            decode_candles(&rows),
            Err(MarketDataError::InvalidField { column: "timestamp", .. })
        ));
    }

    #[test]
    fn short_row_is_rejected() {
        let rows = vec![row(&["1", "1", "1"])];
        assert_eq!(
            decode_candles(&rows),
            Err(MarketDataError::ShortRow { row: 0, found: 3 })
        );
    }

    #[test]
    fn envelope_is_parsed() {
        let raw = r#"{"data":[["10","1","2","0.5","1.5","3"]]}"#;
        let candles = parse_candle_response(raw).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].low, 0.5);
        assert!(parse_candle_response(r#"{"rows":[]}"#).is_err());
    }
}
