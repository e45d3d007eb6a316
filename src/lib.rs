//! halving-sentinel: live price feed core for the Halving Sentinel dashboard
//!
//! This library provides the core components for:
//! - A reconnecting WebSocket client with keepalive
//! - A shared Binance ticker connection with fan-out subscribers
//! - Derived value projections for dashboard widgets
//! - Self-resetting direction flash state
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod flash;
pub mod pipeline;
pub mod project;
pub mod telemetry;
pub mod ws;
