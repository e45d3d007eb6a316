//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized update from the upstream ticker stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Trading symbol (e.g., "BTCUSDT"); empty when the payload omits it
    pub symbol: String,
    /// Last traded price, always positive
    pub last_price: Decimal,
    /// Signed 24h change in percent units
    pub percent_change_24h: Decimal,
    /// 24h quote asset volume, never negative
    pub quote_volume_24h: Decimal,
    /// Local timestamp when the tick was received
    pub received_at: DateTime<Utc>,
}

impl Tick {
    /// Tick carrying only a price, as the minimal upstream payload does
    pub fn from_price(last_price: Decimal) -> Self {
        Self {
            symbol: String::new(),
            last_price,
            percent_change_24h: Decimal::ZERO,
            quote_volume_24h: Decimal::ZERO,
            received_at: Utc::now(),
        }
    }
}

/// Lifecycle of the shared feed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Liveness flag shown by the dashboard as "LIVE"
    pub fn is_live(self) -> bool {
        self == ConnectionState::Connected
    }
}
