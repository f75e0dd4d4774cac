//! Backtest Desk - client control layer for a strategy-backtesting web service
//!
//! This library loads and saves strategy scripts, submits them to the remote
//! backtest engine, and renders the returned trade history onto a chart,
//! a log panel and a results panel.

pub mod bus;
pub mod channel;
pub mod config;
pub mod constants;
pub mod desk;
pub mod document;
pub mod error;
pub mod events;
pub mod selector;
pub mod service;
pub mod session;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use bus::SessionBus;
pub use config::AppConfig;
pub use desk::{Desk, Surfaces};
pub use events::{RunId, SessionEvent};
pub use session::{BacktestOutcome, BacktestSession, SessionState};
pub use types::{BacktestResult, BuySell, ChartAnnotation, StrategySource, TradeEvent};

#[cfg(test)]
mod bus_tests;
#[cfg(test)]
mod config_tests;
