//! Binance 24h ticker stream parsing

use super::Tick;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Binance WebSocket base URL
pub const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Default trading pair for the dashboard
pub const DEFAULT_SYMBOL: &str = "btcusdt";

/// Event type carried by `<symbol>@ticker` messages
const TICKER_EVENT: &str = "24hrTicker";

/// Binance 24h ticker message, reduced to the fields the dashboard reads
#[derive(Debug, Deserialize)]
struct BinanceTickerMessage {
    /// Event type
    #[serde(rename = "e")]
    event_type: Option<String>,
    /// Symbol
    #[serde(rename = "s")]
    symbol: Option<String>,
    /// Last price
    #[serde(rename = "c")]
    last_price: String,
    /// Price change percent
    #[serde(rename = "P")]
    percent_change: Option<String>,
    /// Total traded quote asset volume
    #[serde(rename = "q")]
    quote_volume: Option<String>,
}

/// Why a ticker payload was rejected
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid ticker json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected event type {0:?}")]
    UnexpectedEvent(String),
    #[error("invalid decimal in field {field}: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("last price must be positive, got {0}")]
    NonPositivePrice(Decimal),
    #[error("quote volume must not be negative, got {0}")]
    NegativeVolume(Decimal),
}

/// Build the ticker stream URL for a symbol
pub fn ticker_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/{}@ticker",
        base_url.trim_end_matches('/'),
        symbol.to_lowercase()
    )
}

fn decimal(field: &'static str, value: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(value.trim()).map_err(|_| ParseError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}

fn optional_decimal(field: &'static str, value: Option<&str>) -> Result<Decimal, ParseError> {
    value.map_or(Ok(Decimal::ZERO), |v| decimal(field, v))
}

/// Parse one raw ticker payload into a [`Tick`]
pub fn parse_ticker(msg: &str) -> Result<Tick, ParseError> {
    let ticker: BinanceTickerMessage = serde_json::from_str(msg)?;

    if let Some(event) = ticker.event_type {
        if event != TICKER_EVENT {
            return Err(ParseError::UnexpectedEvent(event));
        }
    }

    let last_price = decimal("c", &ticker.last_price)?;
    if last_price <= Decimal::ZERO {
        return Err(ParseError::NonPositivePrice(last_price));
    }

    let quote_volume_24h = optional_decimal("q", ticker.quote_volume.as_deref())?;
    if quote_volume_24h < Decimal::ZERO {
        return Err(ParseError::NegativeVolume(quote_volume_24h));
    }

    Ok(Tick {
        symbol: ticker.symbol.unwrap_or_default(),
        last_price,
        percent_change_24h: optional_decimal("P", ticker.percent_change.as_deref())?,
        quote_volume_24h,
        received_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticker_url() {
        assert_eq!(
            ticker_url(BINANCE_WS_URL, "BTCUSDT"),
            "wss://stream.binance.com:9443/ws/btcusdt@ticker"
        );
        assert_eq!(
            ticker_url("wss://example.com/ws/", "ethusdt"),
            "wss://example.com/ws/ethusdt@ticker"
        );
    }

    #[test]
    fn test_parse_full_ticker_message() {
        let msg = r#"{
            "e": "24hrTicker",
            "E": 1704067200000,
            "s": "BTCUSDT",
            "p": "850.00",
            "P": "2.04",
            "c": "42500.50",
            "v": "12345.6",
            "q": "524000000.25"
        }"#;

        let tick = parse_ticker(msg).unwrap();
        assert_eq!(tick.symbol, "BTCUSDT");
        assert_eq!(tick.last_price, dec!(42500.50));
        assert_eq!(tick.percent_change_24h, dec!(2.04));
        assert_eq!(tick.quote_volume_24h, dec!(524000000.25));
    }

    #[test]
    fn test_parse_minimal_payload() {
        let tick = parse_ticker(r#"{"c":"100.00"}"#).unwrap();
        assert_eq!(tick.last_price, dec!(100));
        assert_eq!(tick.percent_change_24h, Decimal::ZERO);
        assert_eq!(tick.quote_volume_24h, Decimal::ZERO);
    }

    #[test]
    fn test_parse_negative_change() {
        let tick = parse_ticker(r#"{"c":"99.50","P":"-5.24","q":"10"}"#).unwrap();
        assert_eq!(tick.percent_change_24h, dec!(-5.24));
    }

    #[test]
    fn test_parse_other_event_type() {
        let msg = r#"{"e":"trade","s":"BTCUSDT","c":"1.0"}"#;
        assert!(matches!(
            parse_ticker(msg),
            Err(ParseError::UnexpectedEvent(e)) if e == "trade"
        ));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_ticker("not valid json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_missing_price() {
        assert!(matches!(
            parse_ticker(r#"{"P":"1.0"}"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_invalid_price() {
        assert!(matches!(
            parse_ticker(r#"{"c":"not_a_number"}"#),
            Err(ParseError::InvalidDecimal { field: "c", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_positive_price() {
        assert!(matches!(
            parse_ticker(r#"{"c":"0"}"#),
            Err(ParseError::NonPositivePrice(_))
        ));
        assert!(matches!(
            parse_ticker(r#"{"c":"-1.5"}"#),
            Err(ParseError::NonPositivePrice(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative_volume() {
        assert!(matches!(
            parse_ticker(r#"{"c":"10","q":"-3"}"#),
            Err(ParseError::NegativeVolume(_))
        ));
    }
}
