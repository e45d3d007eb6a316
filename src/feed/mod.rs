//! Price feed module
//!
//! Live 24h ticker from the Binance WebSocket stream, shared by every widget
//! through one reconnecting connection.

mod binance;
mod connection;
mod types;

pub use binance::{parse_ticker, ticker_url, ParseError, BINANCE_WS_URL, DEFAULT_SYMBOL};
pub use connection::{FeedHandle, PriceFeedConnection};
pub use types::{ConnectionState, Tick};
